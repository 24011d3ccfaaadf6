//! Periodic "still working" publisher for a running talk.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::publish::Publisher;

use super::session::heartbeat_text;

/// Shortest period a heartbeat will tick at.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Handle on a running heartbeat task.
///
/// Dropping the handle cancels future ticks; [`Heartbeat::stop`] additionally
/// waits for a tick that is already publishing.
pub struct Heartbeat {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Heartbeat {
    /// Spawn the heartbeat. The first tick fires one `period` from now.
    ///
    /// Periods below [`MIN_PERIOD`] are raised to it.
    pub fn start<P>(
        period: Duration,
        publisher: Arc<P>,
        quoted_prompt: String,
        accumulated: watch::Receiver<String>,
    ) -> Self
    where
        P: Publisher + 'static,
    {
        let period = period.max(MIN_PERIOD);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let content = heartbeat_text(&quoted_prompt, accumulated.borrow().as_str());
                        if let Err(e) = publisher.publish(content).await {
                            tracing::warn!(error = %e, "heartbeat publish failed");
                        }
                    }
                }
            }
        });

        Self {
            cancel,
            task: Some(task),
        }
    }

    /// Request that no further ticks fire, then join the task.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "heartbeat task ended abnormally");
            }
        }
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

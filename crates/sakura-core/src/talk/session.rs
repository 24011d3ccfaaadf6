//! Per-task talk state: the quoted prompt, the accumulated answer, and the
//! heartbeat that republishes it.

use std::time::Instant;

use tokio::sync::watch;

use super::heartbeat::Heartbeat;

/// Marker appended to heartbeat publishes while the answer is still growing.
pub const HEARTBEAT_MARKER: &str = "(...)";

/// Prefix every line of `prompt` with a blockquote marker.
pub fn quote_prompt(prompt: &str) -> String {
    prompt
        .split('\n')
        .map(|line| format!("> {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text shown before any model output exists.
pub fn acknowledgement_text(quoted_prompt: &str) -> String {
    format!("{quoted_prompt}\n...")
}

/// Text shown by a heartbeat tick.
pub fn heartbeat_text(quoted_prompt: &str, accumulated: &str) -> String {
    format!("{quoted_prompt}\n\n{accumulated}{HEARTBEAT_MARKER}")
}

/// Authoritative text published once the stream has completed.
pub fn final_text(quoted_prompt: &str, accumulated: &str) -> String {
    format!("{quoted_prompt}\n\n{accumulated}")
}

/// State owned by one talk task for its whole lifetime.
///
/// The accumulated answer sits behind a `watch` channel: the stream consumer
/// is the only writer, the heartbeat reads consistent snapshots.
pub struct TalkSession {
    quoted_prompt: String,
    accumulated: watch::Sender<String>,
    started_at: Instant,
    heartbeat: Option<Heartbeat>,
}

impl TalkSession {
    pub fn new(prompt: &str) -> Self {
        let (accumulated, _) = watch::channel(String::new());
        Self {
            quoted_prompt: quote_prompt(prompt),
            accumulated,
            started_at: Instant::now(),
            heartbeat: None,
        }
    }

    pub fn quoted_prompt(&self) -> &str {
        &self.quoted_prompt
    }

    /// Append an incremental fragment to the answer.
    pub fn append(&self, fragment: &str) {
        if fragment.is_empty() {
            return;
        }
        self.accumulated.send_modify(|text| text.push_str(fragment));
    }

    /// Snapshot of the answer so far.
    pub fn accumulated_text(&self) -> String {
        self.accumulated.borrow().clone()
    }

    /// A read handle on the answer, for the heartbeat.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.accumulated.subscribe()
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.started_at.elapsed().as_millis()
    }

    pub fn acknowledgement(&self) -> String {
        acknowledgement_text(&self.quoted_prompt)
    }

    pub fn final_content(&self) -> String {
        final_text(&self.quoted_prompt, &self.accumulated.borrow())
    }

    pub fn attach_heartbeat(&mut self, heartbeat: Heartbeat) {
        self.heartbeat = Some(heartbeat);
    }

    /// Stop future heartbeat ticks and wait for an in-flight tick to finish.
    pub async fn stop_heartbeat(&mut self) {
        if let Some(heartbeat) = self.heartbeat.take() {
            heartbeat.stop().await;
        }
    }
}

//! Talk orchestration: relay one prompt to the chat backend and republish
//! the growing answer through a [`Publisher`].
//!
//! Publish sequence for one task:
//! 1. acknowledgement (`quoted prompt + "\n..."`) before the stream is opened
//! 2. heartbeat ticks (`... + "(...)"`) every interval while streaming
//! 3. one final publish with the complete answer, only on normal completion
//!
//! On failure the heartbeat is stopped, the error is logged, and the last
//! heartbeat text stays visible.

pub mod heartbeat;
pub mod session;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;

use sakura_types::chat::{ChatMessage, ContentPart};
use sakura_types::error::ChatError;

use crate::chat::ChatStreamProvider;
use crate::publish::Publisher;

use self::heartbeat::Heartbeat;
use self::session::TalkSession;

/// Default interval between heartbeat publishes.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(500);

/// Lifecycle of one talk task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TalkPhase {
    NotStarted,
    Acknowledged,
    Streaming,
    Completed,
    Failed,
}

impl fmt::Display for TalkPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TalkPhase::NotStarted => write!(f, "not_started"),
            TalkPhase::Acknowledged => write!(f, "acknowledged"),
            TalkPhase::Streaming => write!(f, "streaming"),
            TalkPhase::Completed => write!(f, "completed"),
            TalkPhase::Failed => write!(f, "failed"),
        }
    }
}

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TalkRequest {
    pub prompt: String,
    pub image_url: Option<String>,
    pub system_prompt: Option<String>,
}

impl TalkRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image_url: None,
            system_prompt: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: Option<String>) -> Self {
        self.system_prompt = system_prompt;
        self
    }

    /// Conversation sent upstream: optional system turn, then one user turn.
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(ref system) = self.system_prompt {
            messages.push(ChatMessage::system(system.clone()));
        }

        let mut parts = vec![ContentPart::text(self.prompt.clone())];
        if let Some(ref url) = self.image_url {
            parts.push(ContentPart::image_url(url.clone()));
        }
        messages.push(ChatMessage::User { content: parts });
        messages
    }
}

/// Drives one talk task from prompt to final published text.
pub struct TalkOrchestrator<C, P> {
    chat: Arc<C>,
    publisher: Arc<P>,
    heartbeat_interval: Duration,
}

impl<C, P> TalkOrchestrator<C, P>
where
    C: ChatStreamProvider,
    P: Publisher + 'static,
{
    pub fn new(chat: Arc<C>, publisher: Arc<P>) -> Self {
        Self {
            chat,
            publisher,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
        }
    }

    /// Override the heartbeat period. A zero interval keeps the default.
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        if interval.is_zero() {
            tracing::warn!("zero heartbeat interval ignored");
        } else {
            self.heartbeat_interval = interval;
        }
        self
    }

    /// Run the task to completion and return its terminal phase.
    ///
    /// Never returns an error: by the time this runs, the caller has already
    /// answered the platform and has nowhere to send one.
    pub async fn run(&self, request: TalkRequest) -> TalkPhase {
        let mut session = TalkSession::new(&request.prompt);
        let mut phase = TalkPhase::NotStarted;
        tracing::debug!(%phase, backend = self.chat.name(), "talk starting");

        self.publish(session.acknowledgement()).await;
        phase = TalkPhase::Acknowledged;

        session.attach_heartbeat(Heartbeat::start(
            self.heartbeat_interval,
            Arc::clone(&self.publisher),
            session.quoted_prompt().to_string(),
            session.subscribe(),
        ));

        let result = self.consume(&request, &session, &mut phase).await;
        session.stop_heartbeat().await;

        match result {
            Ok(events) => {
                self.publish(session.final_content()).await;
                phase = TalkPhase::Completed;
                tracing::info!(
                    %phase,
                    events,
                    chars = session.accumulated_text().chars().count(),
                    elapsed_ms = session.elapsed_ms() as u64,
                    "talk completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    last_phase = %phase,
                    error = %e,
                    elapsed_ms = session.elapsed_ms() as u64,
                    "talk failed"
                );
                phase = TalkPhase::Failed;
            }
        }

        phase
    }

    /// Consume the delta stream into the session. Returns the event count.
    async fn consume(
        &self,
        request: &TalkRequest,
        session: &TalkSession,
        phase: &mut TalkPhase,
    ) -> Result<usize, ChatError> {
        let mut events = self.chat.stream_chat(request.to_messages());
        *phase = TalkPhase::Streaming;

        let mut count = 0usize;
        while let Some(event) = events.next().await {
            let event = event?;
            session.append(event.primary_content());
            count += 1;
        }
        Ok(count)
    }

    async fn publish(&self, content: String) {
        if let Err(e) = self.publisher.publish(content).await {
            tracing::warn!(error = %e, "talk publish failed");
        }
    }
}

//! ChatStreamProvider trait definition.
//!
//! The streaming chat client lives in `sakura-infra`; the talk orchestrator
//! only sees this trait, so tests can substitute scripted streams.

use std::pin::Pin;

use futures_util::Stream;

use sakura_types::chat::{ChatDeltaEvent, ChatMessage};
use sakura_types::error::ChatError;

/// Lazy, single-consumer sequence of delta events from one upstream call.
pub type ChatEventStream =
    Pin<Box<dyn Stream<Item = Result<ChatDeltaEvent, ChatError>> + Send + 'static>>;

/// Backend that turns a conversation into a stream of delta events.
///
/// Returns a boxed stream so the stream can outlive `&self` and be moved
/// into a background task. Transport and status failures surface as the
/// first (and only) `Err` item, before any event is yielded.
pub trait ChatStreamProvider: Send + Sync {
    /// Human-readable backend name (e.g., "openai").
    fn name(&self) -> &str;

    /// Open one streaming completion for `messages`. No retries.
    fn stream_chat(&self, messages: Vec<ChatMessage>) -> ChatEventStream;
}

//! Publisher trait definition.

use std::future::Future;

use sakura_types::error::PublishError;

/// Capability that replaces the externally visible message with `content`.
///
/// The talk orchestrator does not know how the text is delivered. Failures
/// are reported back so the caller can log them; nothing is retried.
pub trait Publisher: Send + Sync {
    fn publish(&self, content: String) -> impl Future<Output = Result<(), PublishError>> + Send;
}

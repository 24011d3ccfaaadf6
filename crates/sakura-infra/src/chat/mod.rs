//! Upstream chat completion streaming.
//!
//! - `event_stream`: framing of `data:`-prefixed server-sent lines
//! - `client`: OpenAI-compatible streaming chat client

pub mod client;
pub mod event_stream;

pub use client::OpenAiChatClient;
pub use event_stream::parse_event_stream;

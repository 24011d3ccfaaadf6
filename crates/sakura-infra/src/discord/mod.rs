//! Messaging platform adapters.

pub mod followup;

pub use followup::{DiscordFollowupClient, InteractionPublisher};

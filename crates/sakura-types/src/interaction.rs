//! Discord interaction payloads.
//!
//! Models the subset of the interactions protocol Sakura consumes:
//! the inbound [`Interaction`] envelope (ping and application command
//! invocations) and the outbound [`InteractionResponse`].
//!
//! Reference: <https://discord.com/developers/docs/interactions/receiving-and-responding>

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discord snowflake identifier (transported as a decimal string).
pub type Snowflake = String;

/// Kind of inbound interaction, encoded on the wire as an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum InteractionType {
    Ping,
    ApplicationCommand,
    MessageComponent,
    ApplicationCommandAutocomplete,
    ModalSubmit,
    /// A type code this service does not know about.
    Other(u8),
}

impl From<u8> for InteractionType {
    fn from(code: u8) -> Self {
        match code {
            1 => InteractionType::Ping,
            2 => InteractionType::ApplicationCommand,
            3 => InteractionType::MessageComponent,
            4 => InteractionType::ApplicationCommandAutocomplete,
            5 => InteractionType::ModalSubmit,
            other => InteractionType::Other(other),
        }
    }
}

impl From<InteractionType> for u8 {
    fn from(kind: InteractionType) -> Self {
        match kind {
            InteractionType::Ping => 1,
            InteractionType::ApplicationCommand => 2,
            InteractionType::MessageComponent => 3,
            InteractionType::ApplicationCommandAutocomplete => 4,
            InteractionType::ModalSubmit => 5,
            InteractionType::Other(code) => code,
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionType::Ping => write!(f, "ping"),
            InteractionType::ApplicationCommand => write!(f, "application_command"),
            InteractionType::MessageComponent => write!(f, "message_component"),
            InteractionType::ApplicationCommandAutocomplete => {
                write!(f, "application_command_autocomplete")
            }
            InteractionType::ModalSubmit => write!(f, "modal_submit"),
            InteractionType::Other(code) => write!(f, "unknown({code})"),
        }
    }
}

/// One inbound interaction from the messaging platform.
///
/// `token` is the per-interaction credential used to edit the original
/// response afterwards; it is valid for a limited time on Discord's side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type")]
    pub kind: InteractionType,
    pub id: Snowflake,
    pub application_id: Snowflake,
    pub token: String,
    #[serde(default = "default_version")]
    pub version: u8,
    /// Present for application command invocations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<CommandData>,
}

fn default_version() -> u8 {
    1
}

/// Payload of an application command invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandData {
    pub id: Snowflake,
    pub name: String,
    #[serde(rename = "type", default = "default_command_type")]
    pub kind: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOption>,
}

fn default_command_type() -> u8 {
    1
}

impl CommandData {
    /// Look up an option by name and return its value when it is a string.
    pub fn option_str(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .and_then(|o| o.value.as_str())
    }
}

/// A single named argument supplied with a command invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Kind of interaction response, encoded on the wire as an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum InteractionResponseType {
    Pong,
    ChannelMessageWithSource,
    DeferredChannelMessageWithSource,
    DeferredUpdateMessage,
    UpdateMessage,
    ApplicationCommandAutocompleteResult,
    Modal,
    PremiumRequired,
    Other(u8),
}

impl From<u8> for InteractionResponseType {
    fn from(code: u8) -> Self {
        match code {
            1 => InteractionResponseType::Pong,
            4 => InteractionResponseType::ChannelMessageWithSource,
            5 => InteractionResponseType::DeferredChannelMessageWithSource,
            6 => InteractionResponseType::DeferredUpdateMessage,
            7 => InteractionResponseType::UpdateMessage,
            8 => InteractionResponseType::ApplicationCommandAutocompleteResult,
            9 => InteractionResponseType::Modal,
            10 => InteractionResponseType::PremiumRequired,
            other => InteractionResponseType::Other(other),
        }
    }
}

impl From<InteractionResponseType> for u8 {
    fn from(kind: InteractionResponseType) -> Self {
        match kind {
            InteractionResponseType::Pong => 1,
            InteractionResponseType::ChannelMessageWithSource => 4,
            InteractionResponseType::DeferredChannelMessageWithSource => 5,
            InteractionResponseType::DeferredUpdateMessage => 6,
            InteractionResponseType::UpdateMessage => 7,
            InteractionResponseType::ApplicationCommandAutocompleteResult => 8,
            InteractionResponseType::Modal => 9,
            InteractionResponseType::PremiumRequired => 10,
            InteractionResponseType::Other(code) => code,
        }
    }
}

/// Response returned synchronously to an inbound interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: InteractionResponseType,
}

impl InteractionResponse {
    /// Acknowledge a ping.
    pub fn pong() -> Self {
        Self {
            kind: InteractionResponseType::Pong,
        }
    }

    /// Tell the platform a real answer follows through an edit of the original message.
    pub fn deferred() -> Self {
        Self {
            kind: InteractionResponseType::DeferredChannelMessageWithSource,
        }
    }
}

/// Body of the outbound "edit original response" call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEdit {
    pub content: String,
}

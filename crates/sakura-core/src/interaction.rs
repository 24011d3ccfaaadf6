//! Interaction dispatch: decide what an authenticated interaction means.
//!
//! Only pings and the `talk` command are acted on. Everything else is a
//! protocol error the HTTP layer maps to a server error.

use sakura_types::error::InteractionError;
use sakura_types::interaction::{Interaction, InteractionResponse, InteractionType};

use crate::talk::TalkRequest;

/// Slash command that relays a prompt to the chat backend.
pub const TALK_COMMAND: &str = "talk";
/// Required string option carrying the prompt text.
pub const PROMPT_OPTION: &str = "prompt";
/// Optional string option carrying an image reference.
pub const IMAGE_URL_OPTION: &str = "image_url";

/// Outcome of dispatching one interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Answer the ping; nothing else to do.
    Pong,
    /// Answer with a deferred response, then run a talk in the background.
    Talk(TalkRequest),
}

impl Dispatch {
    /// The synchronous response for the platform.
    pub fn response(&self) -> InteractionResponse {
        match self {
            Dispatch::Pong => InteractionResponse::pong(),
            Dispatch::Talk(_) => InteractionResponse::deferred(),
        }
    }
}

/// Interpret an interaction.
pub fn dispatch(interaction: &Interaction) -> Result<Dispatch, InteractionError> {
    match interaction.kind {
        InteractionType::Ping => Ok(Dispatch::Pong),
        InteractionType::ApplicationCommand => {
            let data = interaction
                .data
                .as_ref()
                .ok_or(InteractionError::MissingData)?;

            match data.name.as_str() {
                TALK_COMMAND => {
                    let prompt = data
                        .option_str(PROMPT_OPTION)
                        .ok_or_else(|| InteractionError::MissingOption(PROMPT_OPTION.to_string()))?;
                    let mut request = TalkRequest::new(prompt);
                    request.image_url = data
                        .option_str(IMAGE_URL_OPTION)
                        .filter(|url| !url.trim().is_empty())
                        .map(str::to_string);
                    Ok(Dispatch::Talk(request))
                }
                other => Err(InteractionError::UnknownCommand(other.to_string())),
            }
        }
        other => Err(InteractionError::UnsupportedType(other.to_string())),
    }
}

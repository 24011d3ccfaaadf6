//! Application state shared by every request.
//!
//! Everything in here is immutable after startup; per-talk state lives in
//! the spawned talk task, never in `AppState`.

use std::sync::Arc;
use std::time::Duration;

use sakura_infra::chat::OpenAiChatClient;
use sakura_infra::config::Settings;
use sakura_infra::crypto::signature::SignatureVerifier;
use sakura_infra::discord::DiscordFollowupClient;

#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<SignatureVerifier>,
    pub chat: Arc<OpenAiChatClient>,
    pub followup: DiscordFollowupClient,
    pub system_prompt: Option<String>,
    pub heartbeat_interval: Duration,
}

impl AppState {
    /// Wire the concrete adapters from validated settings.
    pub fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let chat = OpenAiChatClient::new(settings.openai_api_key, settings.model)?
            .with_base_url(settings.openai_base_url);
        let followup =
            DiscordFollowupClient::new(settings.discord_api_base, settings.application_id)?;

        Ok(Self {
            verifier: Arc::new(SignatureVerifier::new(settings.public_key_hex)),
            chat: Arc::new(chat),
            followup,
            system_prompt: settings.system_prompt,
            heartbeat_interval: settings.heartbeat_interval,
        })
    }
}

//! Edits of the deferred interaction response.
//!
//! After a deferred acknowledgement the visible message belongs to the
//! interaction token. Every publish is a full replacement:
//!
//! ```text
//! PATCH {api_base}/webhooks/{application_id}/{token}/messages/@original
//! {"content": "..."}
//! ```

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use sakura_core::publish::Publisher;
use sakura_types::error::PublishError;
use sakura_types::interaction::MessageEdit;

/// HTTP client for interaction follow-up edits. Cheap to clone.
#[derive(Clone)]
pub struct DiscordFollowupClient {
    client: reqwest::Client,
    api_base: String,
    application_id: String,
}

impl DiscordFollowupClient {
    pub fn new(
        api_base: impl Into<String>,
        application_id: impl Into<String>,
    ) -> Result<Self, PublishError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PublishError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            application_id: application_id.into(),
        })
    }

    fn original_message_url(&self, token: &str) -> String {
        format!(
            "{}/webhooks/{}/{}/messages/@original",
            self.api_base, self.application_id, token
        )
    }

    /// Replace the content of the original response message.
    pub async fn edit_original(&self, token: &str, content: &str) -> Result<(), PublishError> {
        let response = self
            .client
            .patch(self.original_message_url(token))
            .json(&MessageEdit {
                content: content.to_string(),
            })
            .send()
            .await
            .map_err(|e| PublishError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// A [`Publisher`] bound to one interaction token.
    pub fn publisher_for(&self, token: impl Into<String>) -> InteractionPublisher {
        InteractionPublisher {
            client: self.clone(),
            token: SecretString::from(token.into()),
        }
    }
}

/// Publishes by editing the original response of a single interaction.
pub struct InteractionPublisher {
    client: DiscordFollowupClient,
    token: SecretString,
}

impl Publisher for InteractionPublisher {
    async fn publish(&self, content: String) -> Result<(), PublishError> {
        self.client
            .edit_original(self.token.expose_secret(), &content)
            .await
    }
}

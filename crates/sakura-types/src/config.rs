//! Configuration types for Sakura.
//!
//! `AppConfig` mirrors the optional `config.toml`. Every field has a default
//! so a partial (or absent) file is valid; the required credentials are
//! checked later, once environment overrides have been applied.
//!
//! The credential-bearing sections intentionally do not derive `Debug`.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub talk: TalkConfig,
}

/// Listener address for the webhook server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8787
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Messaging platform application settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Hex-encoded Ed25519 public key of the application.
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub application_id: Option<String>,
    #[serde(default = "default_discord_api_base")]
    pub api_base: String,
}

fn default_discord_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            public_key: None,
            application_id: None,
            api_base: default_discord_api_base(),
        }
    }
}

/// Upstream chat service settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Optional leading system turn sent with every talk.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            model: default_model(),
            system_prompt: None,
        }
    }
}

/// Talk task tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TalkConfig {
    /// Interval between heartbeat publishes, in milliseconds.
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
}

fn default_heartbeat_interval_ms() -> u64 {
    500
}

impl Default for TalkConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
        }
    }
}

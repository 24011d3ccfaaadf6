//! Configuration loader for Sakura.
//!
//! Reads an optional `config.toml` (by default `~/.sakura/config.toml`) into
//! [`AppConfig`], applies environment overrides, then validates the result
//! into [`Settings`], the form the server runs on.
//!
//! Environment overrides:
//!
//! | Variable                 | Setting                 |
//! |--------------------------|-------------------------|
//! | `DISCORD_APP_PUBLIC_KEY` | `discord.public_key`    |
//! | `DISCORD_APP_ID`         | `discord.application_id`|
//! | `DISCORD_API_BASE`       | `discord.api_base`      |
//! | `OPENAI_API_KEY`         | `openai.api_key`        |
//! | `OPENAI_BASE_URL`        | `openai.base_url`       |
//! | `OPENAI_MODEL`           | `openai.model`          |
//! | `SAKURA_SYSTEM_PROMPT`   | `openai.system_prompt`  |
//! | `SAKURA_HOST`            | `server.host`           |
//! | `SAKURA_PORT`            | `server.port`           |

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;

use sakura_types::config::{AppConfig, ServerConfig};
use sakura_types::error::ConfigError;

use crate::crypto::signature::parse_public_key;

/// Directory under the home directory holding `config.toml`.
const CONFIG_DIR: &str = ".sakura";
const CONFIG_FILE: &str = "config.toml";

/// Default location of the configuration file.
///
/// Falls back to the working directory when no home directory is known.
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIR))
        .unwrap_or_default()
        .join(CONFIG_FILE)
}

/// Load configuration from `path`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to read or parse, logs a warning and returns the default.
/// - Otherwise returns the parsed config.
pub async fn load_config(path: &Path) -> AppConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            AppConfig::default()
        }
    }
}

/// Apply process environment overrides.
pub fn apply_env_overrides(config: &mut AppConfig) {
    apply_overrides(config, |name| std::env::var(name).ok());
}

/// Apply overrides from an arbitrary variable lookup. Empty values are ignored.
pub fn apply_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = var("DISCORD_APP_PUBLIC_KEY") {
        config.discord.public_key = Some(v);
    }
    if let Some(v) = var("DISCORD_APP_ID") {
        config.discord.application_id = Some(v);
    }
    if let Some(v) = var("DISCORD_API_BASE") {
        config.discord.api_base = v;
    }
    if let Some(v) = var("OPENAI_API_KEY") {
        config.openai.api_key = Some(v);
    }
    if let Some(v) = var("OPENAI_BASE_URL") {
        config.openai.base_url = v;
    }
    if let Some(v) = var("OPENAI_MODEL") {
        config.openai.model = v;
    }
    if let Some(v) = var("SAKURA_SYSTEM_PROMPT") {
        config.openai.system_prompt = Some(v);
    }
    if let Some(v) = var("SAKURA_HOST") {
        config.server.host = v;
    }
    if let Some(v) = var("SAKURA_PORT") {
        match v.parse() {
            Ok(port) => config.server.port = port,
            Err(_) => tracing::warn!(value = %v, "ignoring unparseable SAKURA_PORT"),
        }
    }
}

/// Validated runtime settings.
///
/// Secrets stay wrapped; `Settings` has no `Debug` impl.
pub struct Settings {
    pub server: ServerConfig,
    pub public_key_hex: String,
    pub application_id: String,
    pub discord_api_base: String,
    pub openai_api_key: SecretString,
    pub openai_base_url: String,
    pub model: String,
    pub system_prompt: Option<String>,
    pub heartbeat_interval: Duration,
}

impl Settings {
    /// Validate a merged config.
    ///
    /// The public key, application id and API key are required; the public
    /// key must be a 32-byte hex Ed25519 key.
    pub fn from_config(config: AppConfig) -> Result<Self, ConfigError> {
        let public_key_hex = required(config.discord.public_key, "discord.public_key")?;
        if public_key_hex.len() != 64 || parse_public_key(&public_key_hex).is_none() {
            return Err(ConfigError::Invalid {
                name: "discord.public_key",
                reason: "expected 64 hex characters encoding an Ed25519 public key".to_string(),
            });
        }

        let application_id = required(config.discord.application_id, "discord.application_id")?;
        let api_key = required(config.openai.api_key, "openai.api_key")?;

        if config.talk.heartbeat_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                name: "talk.heartbeat_interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            server: config.server,
            public_key_hex,
            application_id,
            discord_api_base: config.discord.api_base,
            openai_api_key: SecretString::from(api_key),
            openai_base_url: config.openai.base_url,
            model: config.openai.model,
            system_prompt: config
                .openai
                .system_prompt
                .filter(|p| !p.trim().is_empty()),
            heartbeat_interval: Duration::from_millis(config.talk.heartbeat_interval_ms),
        })
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

use thiserror::Error;

/// Protocol errors raised while interpreting an inbound interaction.
#[derive(Debug, Error)]
pub enum InteractionError {
    #[error("invalid interaction type: {0}")]
    UnsupportedType(String),

    #[error("unknown command: '{0}'")]
    UnknownCommand(String),

    #[error("command invocation is missing its data payload")]
    MissingData,

    #[error("missing required option '{0}'")]
    MissingOption(String),
}

/// Errors from the upstream streaming chat service.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("stream error: {0}")]
    Stream(String),

    #[error("malformed stream event: {0}")]
    Deserialization(String),
}

/// Errors from the outbound message-edit call.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("message edit rejected with HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Errors raised while assembling the runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting '{0}'")]
    Missing(&'static str),

    #[error("invalid setting '{name}': {reason}")]
    Invalid { name: &'static str, reason: String },
}

//! Application error type mapping to HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use sakura_types::error::InteractionError;

/// Body sent with every rejected signature.
pub const INVALID_SIGNATURE_MESSAGE: &str = "invalid request signature";

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Missing or invalid request signature.
    Unauthorized,
    /// Signed body that is not a decodable interaction.
    BadRequest(String),
    /// Authenticated interaction the server cannot act on.
    Interaction(InteractionError),
}

impl From<InteractionError> for AppError {
    fn from(e: InteractionError) -> Self {
        AppError::Interaction(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, INVALID_SIGNATURE_MESSAGE).into_response()
            }
            AppError::BadRequest(message) => {
                tracing::debug!(error = %message, "rejecting undecodable interaction");
                (StatusCode::BAD_REQUEST, axum::Json(json!({ "error": message }))).into_response()
            }
            AppError::Interaction(e) => {
                tracing::warn!(error = %e, "interaction not handled");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(json!({ "error": e.to_string() })),
                )
                    .into_response()
            }
        }
    }
}

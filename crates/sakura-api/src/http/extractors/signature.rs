//! Signed-body extractor.
//!
//! Requires the `x-signature-ed25519` and `x-signature-timestamp` headers
//! before the body is read, then verifies them against the application's
//! public key before any handler logic runs. Every rejection is a 401. The body is
//! kept as the exact bytes received; re-serializing it would break the
//! signature.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::HeaderMap;

use sakura_infra::crypto::signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER};

use crate::http::error::AppError;
use crate::state::AppState;

/// A request body whose signature has been verified.
pub struct SignedBody(pub Bytes);

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

impl FromRequest<AppState> for SignedBody {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let headers = req.headers().clone();
        let (Some(signature), Some(timestamp)) = (
            header_str(&headers, SIGNATURE_HEADER),
            header_str(&headers, TIMESTAMP_HEADER),
        ) else {
            tracing::debug!(
                has_signature = headers.contains_key(SIGNATURE_HEADER),
                has_timestamp = headers.contains_key(TIMESTAMP_HEADER),
                "signature headers missing"
            );
            return Err(AppError::Unauthorized);
        };

        // A body that cannot be read can never verify.
        let body = Bytes::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e, "failed to read signed body");
            AppError::Unauthorized
        })?;

        if !state
            .verifier
            .verify_request(Some(signature), Some(timestamp), &body)
        {
            tracing::debug!("signature verification failed");
            return Err(AppError::Unauthorized);
        }

        Ok(SignedBody(body))
    }
}

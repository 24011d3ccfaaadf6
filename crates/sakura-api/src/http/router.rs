//! Axum router configuration with middleware.
//!
//! - `POST /interactions`  signed interaction webhook
//! - `GET /ping`           liveness probe
//!
//! Middleware: request tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/interactions", post(handlers::interactions::receive_interaction))
        .route("/ping", get(handlers::health::ping))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

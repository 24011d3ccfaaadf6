//! HTTP layer for Sakura.
//!
//! Axum-based server exposing the signed interaction webhook at `/interactions` and a
//! liveness probe at `/ping`.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;

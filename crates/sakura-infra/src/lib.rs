//! Infrastructure layer for Sakura.
//!
//! Contains implementations of the ports defined in `sakura-core`:
//! the upstream streaming chat client (and its event stream parser), the
//! Discord message-edit publisher, Ed25519 request verification, and the
//! configuration loader.

pub mod chat;
pub mod config;
pub mod crypto;
pub mod discord;

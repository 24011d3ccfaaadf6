//! Shared domain types for Sakura.
//!
//! This crate contains the data shapes exchanged across the Sakura service:
//! Discord interaction payloads, chat completion wire types, configuration,
//! and the error enums each layer reports.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod interaction;

//! Business logic and port trait definitions for Sakura.
//!
//! This crate defines the traits (ports) the infrastructure layer
//! implements -- [`chat::ChatStreamProvider`] and [`publish::Publisher`] --
//! plus the logic that drives them. It depends only on `sakura-types`,
//! never on `sakura-infra` or any HTTP crate.

pub mod chat;
pub mod interaction;
pub mod publish;
pub mod talk;

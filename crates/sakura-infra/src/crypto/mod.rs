//! Cryptographic operations for Sakura.
//!
//! - `signature`: Ed25519 verification of inbound interaction requests

pub mod signature;

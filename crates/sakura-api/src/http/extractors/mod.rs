//! Request extractors.

pub mod signature;

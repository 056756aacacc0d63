//! Cross-cutting error types for Relay.
//!
//! Crate-specific errors (`DecodeError`, `RouterError`, `StoreError`, ...)
//! live in their own crates. `relay-cli` converges them through `anyhow`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// No message, block or link with this id.
    #[error("{entity_type} '{id}' does not exist")]
    NotFound { entity_type: String, id: String },

    /// Content that should carry structure (e.g. a plan) does not.
    #[error("invalid content: {0}")]
    Validation(String),
}

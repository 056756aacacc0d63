//! Store error types.

use relay_core::errors::CoreError;
use relay_events::EventError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Lookup of a message or research block failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A user message reused an existing id.
    #[error("Duplicate message id: {0}")]
    DuplicateMessage(String),

    /// The event stream failed. In-flight messages were finalized.
    #[error("Event stream failed: {0}")]
    Transport(#[from] EventError),
}

impl StoreError {
    pub(crate) fn not_found(entity_type: &str, id: &str) -> Self {
        Self::Core(CoreError::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        })
    }
}

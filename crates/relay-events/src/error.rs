//! Error types for event decoding and stream consumption.

use thiserror::Error;

/// A single event payload that could not be interpreted.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload is not valid JSON for the named event.
    #[error("malformed '{event}' payload: {source}")]
    Malformed {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures that end an event stream.
#[derive(Debug, Error)]
pub enum EventError {
    /// The underlying transport failed (network error, aborted response).
    #[error("transport error: {0}")]
    Transport(String),
}

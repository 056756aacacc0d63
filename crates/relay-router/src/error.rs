//! Router error types.

use thiserror::Error;

use crate::stage::PipelineStage;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterError {
    /// The outcome leads to a stage the current stage cannot move to.
    #[error("Invalid pipeline transition from {from} to {to}")]
    InvalidTransition {
        from: PipelineStage,
        to: PipelineStage,
    },
}

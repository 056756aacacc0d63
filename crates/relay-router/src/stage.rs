//! Pipeline stages and their state machine.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a request is in the pipeline.
///
/// ```text
/// fast_path ──► succeeded
///     │
///     ▼
/// escalated ─► planning ─► executing ─► validating ─► reporting ─► succeeded
///                 ▲   │                     │
///                 │   ▼                     ▼
///                 │ failed ◄──────────── reflecting
///                 └─────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    FastPath,
    Escalated,
    Planning,
    Executing,
    Validating,
    Reflecting,
    Reporting,
    Succeeded,
    Failed,
}

impl PipelineStage {
    #[must_use]
    #[allow(clippy::match_same_arms)]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::FastPath => &[Self::Succeeded, Self::Escalated],
            Self::Escalated => &[Self::Planning],
            Self::Planning => &[Self::Executing, Self::Failed],
            Self::Executing => &[Self::Validating],
            Self::Validating => &[Self::Reporting, Self::Reflecting],
            Self::Reflecting => &[Self::Planning, Self::Failed],
            Self::Reporting => &[Self::Succeeded],
            Self::Succeeded | Self::Failed => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FastPath => "fast_path",
            Self::Escalated => "escalated",
            Self::Planning => "planning",
            Self::Executing => "executing",
            Self::Validating => "validating",
            Self::Reflecting => "reflecting",
            Self::Reporting => "reporting",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

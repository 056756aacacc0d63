//! Roles, agent tags, plan step kinds, and escalation triggers for Relay.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`,
//! matching the tags the agent pipeline writes into its event payloads.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Who authored a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    #[default]
    Assistant,
    /// Roles such as `tool` or `system`. Content still merges; the message
    /// never joins a research block.
    #[serde(other)]
    Other,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AgentKind
// ---------------------------------------------------------------------------

/// The backend node that produced a message.
///
/// ```text
/// coordinator ─┬─ react_agent ─────────────────────────────── (answer)
///              └─ planner → pm_agent/researcher/coder → validator
///                    ↑                                     │
///                    └────────────── reflector ←───────────┘
///                                                 → reporter
/// ```
///
/// Agent names the pipeline does not know yet deserialize to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Coordinator,
    Planner,
    PmAgent,
    ReactAgent,
    Researcher,
    Coder,
    Reporter,
    Validator,
    Reflector,
    Podcast,
    #[serde(other)]
    Other,
}

impl AgentKind {
    /// Whether a message from this agent belongs to a research block.
    #[must_use]
    pub const fn joins_research(self) -> bool {
        matches!(
            self,
            Self::Planner
                | Self::ReactAgent
                | Self::PmAgent
                | Self::Researcher
                | Self::Coder
                | Self::Validator
                | Self::Reflector
                | Self::Reporter
        )
    }

    /// Agents whose streamed thoughts are picked up by the recovery scan.
    #[must_use]
    pub const fn emits_thoughts(self) -> bool {
        matches!(self, Self::PmAgent | Self::ReactAgent | Self::Planner)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Coordinator => "coordinator",
            Self::Planner => "planner",
            Self::PmAgent => "pm_agent",
            Self::ReactAgent => "react_agent",
            Self::Researcher => "researcher",
            Self::Coder => "coder",
            Self::Reporter => "reporter",
            Self::Validator => "validator",
            Self::Reflector => "reflector",
            Self::Podcast => "podcast",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StepType
// ---------------------------------------------------------------------------

/// Kind of work a plan step asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    #[default]
    PmQuery,
    Research,
    Processing,
}

impl StepType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PmQuery => "pm_query",
            Self::Research => "research",
            Self::Processing => "processing",
        }
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EscalationTrigger
// ---------------------------------------------------------------------------

/// Why a fast ReAct attempt was handed over to the planner pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EscalationTrigger {
    /// Tool execution failed repeatedly within the recent attempt window.
    RepeatedToolErrors,
    /// The agent's own reasoning asked for a plan.
    PlanningRequested,
    /// A tool reported that the task is too complex for the fast path.
    ComplexitySignal,
    /// The ReAct loop hit its iteration cap without an answer.
    IterationBudgetExhausted,
    /// The user's follow-up asked for more than the fast answer gave.
    UserDissatisfied,
}

impl EscalationTrigger {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RepeatedToolErrors => "repeated_tool_errors",
            Self::PlanningRequested => "planning_requested",
            Self::ComplexitySignal => "complexity_signal",
            Self::IterationBudgetExhausted => "iteration_budget_exhausted",
            Self::UserDissatisfied => "user_dissatisfied",
        }
    }
}

impl fmt::Display for EscalationTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

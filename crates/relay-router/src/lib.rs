//! # relay-router
//!
//! The escalation protocol shared by the agent pipeline and its clients.
//!
//! A run starts on the fast ReAct path. [`FastPathMonitor`] watches tool
//! attempts, iterations and reasoning for an [`EscalationTrigger`]; the
//! [`FollowUpAssessor`] does the same for the user's reply to a fast answer.
//! Once escalated, a [`PipelineRun`] moves through plan, execute, validate
//! and (on rejection) reflect. The retry counter is a [`ReplanBudget`] owned
//! by the run and spent only by the reflecting stage, so the loop is bounded
//! and nothing else can write the counter.
//!
//! [`EscalationTrigger`]: relay_core::enums::EscalationTrigger

pub mod budget;
pub mod error;
pub mod feedback;
pub mod monitor;
pub mod run;
pub mod stage;

pub use budget::ReplanBudget;
pub use error::RouterError;
pub use feedback::{FollowUpAssessor, FollowUpClassifier, FollowUpVerdict};
pub use monitor::{FastPathMonitor, ToolAttempt, ToolSignal};
pub use run::{PipelineRun, StageOutcome};
pub use stage::PipelineStage;

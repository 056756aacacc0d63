//! Entity structs for Relay conversation state.
//!
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` for JSON
//! roundtrip and schema validation.

mod escalation;
mod message;
mod plan;
mod thought;

pub use escalation::EscalationLink;
pub use message::{InterruptOption, Message, ReactThought, ToolCall};
pub use plan::{Plan, PlanStep};
pub use thought::Thought;

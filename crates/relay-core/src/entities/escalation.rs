use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::EscalationTrigger;

/// One-way layout relation from an abandoned ReAct message to the planner
/// message that took over. It never implies shared content.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct EscalationLink {
    pub react_message_id: String,
    pub planner_message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<EscalationTrigger>,
}

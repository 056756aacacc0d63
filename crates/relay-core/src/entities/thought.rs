use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::AgentKind;

/// A thought as shown for a research block, with its source attached.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Thought {
    pub thought: String,
    pub before_tool: bool,
    pub step_index: u32,
    pub message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentKind>,
}

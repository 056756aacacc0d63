use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::enums::{AgentKind, Role};

/// One logical turn (or sub-turn) of the conversation.
///
/// Text arrives incrementally: `content` only ever grows while
/// `is_streaming` is true, and `content_chunks` keeps every delta in arrival
/// order so the UI can replay the reveal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentKind>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub content_chunks: Vec<String>,
    #[serde(default)]
    pub reasoning_content: String,
    #[serde(default)]
    pub reasoning_content_chunks: Vec<String>,
    #[serde(default)]
    pub is_streaming: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default)]
    pub react_thoughts: Vec<ReactThought>,
    /// Human-in-the-loop choices attached by an `interrupt` event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<InterruptOption>>,
    /// The option value the user answered an interrupt with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interrupt_feedback: Option<String>,
    /// Highest chunk sequence number merged so far, when the backend stamps chunks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seq: Option<u64>,
}

impl Message {
    /// A fresh assistant message that is still receiving chunks.
    #[must_use]
    pub fn streaming(id: impl Into<String>, role: Role, agent: Option<AgentKind>) -> Self {
        Self {
            id: id.into(),
            role,
            agent,
            is_streaming: true,
            ..Self::default()
        }
    }

    /// A completed user message (optimistic client-side turn).
    #[must_use]
    pub fn user(id: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            id: id.into(),
            role: Role::User,
            content_chunks: vec![content.clone()],
            content,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_from(&self, agent: AgentKind) -> bool {
        self.agent == Some(agent)
    }

    #[must_use]
    pub fn tool_call(&self, tool_call_id: &str) -> Option<&ToolCall> {
        self.tool_calls.iter().find(|call| call.id == tool_call_id)
    }

    #[must_use]
    pub fn has_thought(&self, text: &str) -> bool {
        self.react_thoughts.iter().any(|t| t.thought == text)
    }

    /// Whether the message is waiting for the user to pick an interrupt option.
    #[must_use]
    pub fn awaits_feedback(&self) -> bool {
        self.options.as_ref().is_some_and(|options| !options.is_empty())
            && self.interrupt_feedback.is_none()
    }
}

/// A tool invocation requested by an agent, and its result once it arrives.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ToolCall {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(default)]
    pub name: String,
    /// Argument text, concatenated from streamed partial-JSON fragments.
    #[serde(default)]
    pub args: String,
    /// Set at most once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl ToolCall {
    /// Parse the accumulated argument text. `None` while the JSON is incomplete.
    #[must_use]
    pub fn parsed_args(&self) -> Option<serde_json::Value> {
        if self.args.trim().is_empty() {
            return None;
        }
        serde_json::from_str(&self.args).ok()
    }
}

/// A statement of intent streamed by an agent ahead of (or alongside) a tool call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ReactThought {
    pub thought: String,
    /// `null` reads as 0.
    #[serde(default, deserialize_with = "null_as_default")]
    #[schemars(with = "Option<u32>")]
    pub step_index: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    #[schemars(with = "Option<bool>")]
    pub before_tool: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One human-in-the-loop choice.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct InterruptOption {
    pub text: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsed_args_waits_for_complete_json() {
        let mut call = ToolCall {
            id: "call-1".into(),
            args: r#"{"sprint_id":"#.into(),
            ..ToolCall::default()
        };
        assert!(call.parsed_args().is_none());

        call.args.push_str("5}");
        assert_eq!(call.parsed_args(), Some(serde_json::json!({"sprint_id": 5})));
    }

    #[test]
    fn null_thought_fields_read_as_defaults() {
        let thoughts: Vec<ReactThought> = serde_json::from_str(
            r#"[{"thought":"Use list_sprints","step_index":null,"before_tool":null},{"thought":"Second","step_index":1}]"#,
        )
        .unwrap();
        assert_eq!(thoughts[0].step_index, 0);
        assert!(!thoughts[0].before_tool);
        assert_eq!(thoughts[1].step_index, 1);
    }

    #[test]
    fn user_message_is_not_streaming() {
        let message = Message::user("u-1", "How is sprint 5 going?");
        assert_eq!(message.role, Role::User);
        assert!(!message.is_streaming);
        assert_eq!(message.content_chunks, vec!["How is sprint 5 going?"]);
    }

    #[test]
    fn awaits_feedback_until_answered() {
        let mut message = Message::streaming("m-1", Role::Assistant, Some(AgentKind::Planner));
        assert!(!message.awaits_feedback());

        message.options = Some(vec![InterruptOption {
            text: "Start".into(),
            value: "accepted".into(),
        }]);
        assert!(message.awaits_feedback());

        message.interrupt_feedback = Some("accepted".into());
        assert!(!message.awaits_feedback());
    }
}

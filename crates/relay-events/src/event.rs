//! Typed chat events and their wire payloads.
//!
//! Every payload names the message it targets by `id`. All other fields are
//! optional so a partially specified event still merges whatever it carries.

use relay_core::entities::{InterruptOption, ReactThought};
use relay_core::enums::{AgentKind, Role};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event names the decoder recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MessageChunk,
    ToolCalls,
    ToolCallChunks,
    ToolCallResult,
    Thoughts,
    Interrupt,
}

impl EventKind {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "message_chunk" => Some(Self::MessageChunk),
            "tool_calls" => Some(Self::ToolCalls),
            "tool_call_chunks" => Some(Self::ToolCallChunks),
            "tool_call_result" => Some(Self::ToolCallResult),
            "thoughts" => Some(Self::Thoughts),
            "interrupt" => Some(Self::Interrupt),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MessageChunk => "message_chunk",
            Self::ToolCalls => "tool_calls",
            Self::ToolCallChunks => "tool_call_chunks",
            Self::ToolCallResult => "tool_call_result",
            Self::Thoughts => "thoughts",
            Self::Interrupt => "interrupt",
        }
    }
}

/// A decoded stream event.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    MessageChunk(MessageChunk),
    ToolCalls(ToolCallsEvent),
    ToolCallChunks(ToolCallsEvent),
    ToolCallResult(ToolCallResultEvent),
    Thoughts(ThoughtsEvent),
    Interrupt(InterruptEvent),
    /// An event name this version does not understand. Merged as a no-op.
    Unknown { name: String },
}

impl ChatEvent {
    /// Wire name of the event.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::MessageChunk(_) => EventKind::MessageChunk.as_str(),
            Self::ToolCalls(_) => EventKind::ToolCalls.as_str(),
            Self::ToolCallChunks(_) => EventKind::ToolCallChunks.as_str(),
            Self::ToolCallResult(_) => EventKind::ToolCallResult.as_str(),
            Self::Thoughts(_) => EventKind::Thoughts.as_str(),
            Self::Interrupt(_) => EventKind::Interrupt.as_str(),
            Self::Unknown { name } => name,
        }
    }

    /// Id of the message the payload names.
    ///
    /// For `tool_call_result` this is the id of the tool message, not the
    /// message that owns the call.
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        match self {
            Self::MessageChunk(e) => Some(&e.id),
            Self::ToolCalls(e) | Self::ToolCallChunks(e) => Some(&e.id),
            Self::ToolCallResult(e) => Some(&e.id),
            Self::Thoughts(e) => Some(&e.id),
            Self::Interrupt(e) => Some(&e.id),
            Self::Unknown { .. } => None,
        }
    }
}

/// `message_chunk`: a text and/or reasoning delta.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageChunk {
    pub id: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub agent: Option<AgentKind>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning_content: Option<String>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    /// Optional per-message sequence number used to drop redelivered chunks.
    #[serde(default)]
    pub seq: Option<u64>,
    /// Set on the first planner chunk when the backend escalated a ReAct attempt.
    #[serde(default)]
    pub escalated_from: Option<String>,
}

/// `tool_calls` / `tool_call_chunks`: tool call deltas for one message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCallsEvent {
    pub id: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub agent: Option<AgentKind>,
    #[serde(default, alias = "tool_call_chunks")]
    pub tool_calls: Vec<ToolCallDelta>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// One tool call delta. A delta without `id` continues the call at `index`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCallDelta {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub args: Option<ToolArgs>,
}

/// Tool arguments as they appear on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolArgs {
    /// A streamed partial-JSON fragment, concatenated with its neighbours.
    Fragment(String),
    /// A complete argument value.
    Complete(Value),
}

/// `tool_call_result`: the output of one tool call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResultEvent {
    pub id: String,
    pub tool_call_id: String,
    #[serde(default, alias = "content")]
    pub result: Value,
}

impl ToolCallResultEvent {
    /// The result as display text: strings verbatim, anything else as JSON.
    #[must_use]
    pub fn result_text(&self) -> String {
        match &self.result {
            Value::String(text) => text.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// `thoughts`: agent intent statements for one message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThoughtsEvent {
    pub id: String,
    #[serde(default)]
    pub agent: Option<AgentKind>,
    #[serde(default)]
    pub react_thoughts: Vec<ReactThought>,
}

/// `interrupt`: human-in-the-loop choices for one message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterruptEvent {
    pub id: String,
    #[serde(default)]
    pub agent: Option<AgentKind>,
    #[serde(default)]
    pub options: Vec<InterruptOption>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn args_fragment_and_complete_value() {
        let delta: ToolCallDelta =
            serde_json::from_value(json!({"id": "c1", "args": "{\"a\":"})).unwrap();
        assert_eq!(delta.args, Some(ToolArgs::Fragment("{\"a\":".into())));

        let delta: ToolCallDelta =
            serde_json::from_value(json!({"id": "c1", "args": {"a": 1}})).unwrap();
        assert_eq!(delta.args, Some(ToolArgs::Complete(json!({"a": 1}))));
    }

    #[test]
    fn tool_call_chunks_field_alias() {
        let event: ToolCallsEvent = serde_json::from_value(json!({
            "id": "m1",
            "tool_call_chunks": [{"index": 0, "args": "{}"}]
        }))
        .unwrap();
        assert_eq!(event.tool_calls.len(), 1);
        assert_eq!(event.tool_calls[0].index, Some(0));
    }

    #[test]
    fn result_text_keeps_strings_and_serializes_json() {
        let text = ToolCallResultEvent {
            result: json!("3 open tasks"),
            ..ToolCallResultEvent::default()
        };
        assert_eq!(text.result_text(), "3 open tasks");

        let structured = ToolCallResultEvent {
            result: json!([{"id": 5}]),
            ..ToolCallResultEvent::default()
        };
        assert_eq!(structured.result_text(), r#"[{"id":5}]"#);
    }

    #[test]
    fn legacy_content_field_is_accepted_as_result() {
        let event: ToolCallResultEvent = serde_json::from_value(json!({
            "id": "tool-1",
            "tool_call_id": "c1",
            "content": "ok"
        }))
        .unwrap();
        assert_eq!(event.result_text(), "ok");
    }

    #[test]
    fn kind_names_roundtrip() {
        for kind in [
            EventKind::MessageChunk,
            EventKind::ToolCalls,
            EventKind::ToolCallChunks,
            EventKind::ToolCallResult,
            EventKind::Thoughts,
            EventKind::Interrupt,
        ] {
            assert_eq!(EventKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(EventKind::from_name("podcast_audio"), None);
    }
}

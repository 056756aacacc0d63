//! The message reducer.
//!
//! Every event degrades to a no-op for whatever it cannot interpret; nothing
//! here returns an error.

use relay_core::entities::{Message, ToolCall};
use relay_core::enums::Role;
use relay_events::{
    ChatEvent, InterruptEvent, MessageChunk, ThoughtsEvent, ToolArgs, ToolCallDelta,
    ToolCallResultEvent, ToolCallsEvent,
};

use crate::conversation::Conversation;

/// What a merge changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The message the event landed on. `None` for unknown events and for
    /// tool results that were buffered.
    pub message_id: Option<String>,
    /// The message was created by this event.
    pub created: bool,
    /// This event ended the message's stream.
    pub finished: bool,
}

impl MergeOutcome {
    fn touched(message_id: &str, created: bool, finished: bool) -> Self {
        Self {
            message_id: Some(message_id.to_string()),
            created,
            finished,
        }
    }
}

/// Merge one event into the conversation.
///
/// Duplicate `tool_call_result` and `thoughts` deliveries are no-ops, and so
/// are `message_chunk` redeliveries when the backend stamps a `seq`.
pub fn merge(conversation: &mut Conversation, event: &ChatEvent) -> MergeOutcome {
    match event {
        ChatEvent::MessageChunk(chunk) => merge_message_chunk(conversation, chunk),
        ChatEvent::ToolCalls(calls) | ChatEvent::ToolCallChunks(calls) => {
            merge_tool_calls(conversation, calls)
        }
        ChatEvent::ToolCallResult(result) => merge_tool_call_result(conversation, result),
        ChatEvent::Thoughts(thoughts) => merge_thoughts(conversation, thoughts),
        ChatEvent::Interrupt(interrupt) => merge_interrupt(conversation, interrupt),
        ChatEvent::Unknown { name } => {
            tracing::debug!(event = %name, "unknown event merged as no-op");
            MergeOutcome::default()
        }
    }
}

fn merge_message_chunk(conversation: &mut Conversation, chunk: &MessageChunk) -> MergeOutcome {
    let (message, created) =
        conversation.ensure_message(&chunk.id, chunk.role.unwrap_or_default(), chunk.agent);

    if let Some(seq) = chunk.seq {
        if message.last_seq.is_some_and(|last| seq <= last) {
            tracing::debug!(message_id = %chunk.id, seq, "dropping redelivered chunk");
            return MergeOutcome::touched(&chunk.id, created, false);
        }
        message.last_seq = Some(seq);
    }

    if let Some(content) = chunk.content.as_deref().filter(|c| !c.is_empty()) {
        message.content.push_str(content);
        message.content_chunks.push(content.to_string());
    }
    if let Some(reasoning) = chunk.reasoning_content.as_deref().filter(|c| !c.is_empty()) {
        message.reasoning_content.push_str(reasoning);
        message.reasoning_content_chunks.push(reasoning.to_string());
    }

    let finished = finish(message, chunk.finish_reason.as_deref());
    MergeOutcome::touched(&chunk.id, created, finished)
}

fn merge_tool_calls(conversation: &mut Conversation, event: &ToolCallsEvent) -> MergeOutcome {
    let (message, created) =
        conversation.ensure_message(&event.id, event.role.unwrap_or(Role::Assistant), event.agent);

    let mut call_ids = Vec::new();
    for delta in &event.tool_calls {
        let call = upsert_tool_call(message, delta);
        if !call.id.is_empty() {
            call_ids.push(call.id.clone());
        }
    }
    let finished = finish(message, event.finish_reason.as_deref());

    conversation.index_tool_calls(&event.id, &call_ids);
    MergeOutcome::touched(&event.id, created, finished)
}

/// Locate the call a delta continues, or append a new one, and apply the delta.
fn upsert_tool_call<'a>(message: &'a mut Message, delta: &ToolCallDelta) -> &'a mut ToolCall {
    let delta_id = delta.id.as_deref().filter(|id| !id.is_empty());

    let position = match (delta_id, delta.index) {
        (Some(id), _) => message.tool_calls.iter().position(|c| c.id == id),
        (None, Some(index)) => message
            .tool_calls
            .iter()
            .position(|c| c.index == Some(index)),
        (None, None) => message.tool_calls.len().checked_sub(1),
    };

    let position = position.unwrap_or_else(|| {
        message.tool_calls.push(ToolCall {
            id: delta_id.unwrap_or_default().to_string(),
            index: delta.index,
            ..ToolCall::default()
        });
        message.tool_calls.len() - 1
    });

    let call = &mut message.tool_calls[position];
    if let Some(name) = delta.name.as_deref().filter(|n| !n.is_empty()) {
        call.name = name.to_string();
    }
    if call.index.is_none() {
        call.index = delta.index;
    }
    if call.id.is_empty()
        && let Some(id) = delta_id
    {
        call.id = id.to_string();
    }
    match &delta.args {
        Some(ToolArgs::Fragment(fragment)) => call.args.push_str(fragment),
        Some(ToolArgs::Complete(value)) => call.args = value.to_string(),
        None => {}
    }
    call
}

fn merge_tool_call_result(
    conversation: &mut Conversation,
    event: &ToolCallResultEvent,
) -> MergeOutcome {
    let call_id = event.tool_call_id.as_str();

    if let Some(owner) = conversation.tool_call_owners.get(call_id).cloned()
        && let Some(call) = conversation
            .messages
            .get_mut(&owner)
            .and_then(|m| m.tool_calls.iter_mut().find(|c| c.id == call_id))
    {
        if call.result.is_some() {
            tracing::debug!(tool_call_id = %call_id, "ignoring duplicate tool result");
        } else {
            call.result = Some(event.result_text());
        }
        return MergeOutcome::touched(&owner, false, false);
    }

    tracing::debug!(tool_call_id = %call_id, "buffering result for unseen tool call");
    conversation
        .pending_results
        .entry(call_id.to_string())
        .or_insert_with(|| event.result_text());
    MergeOutcome::default()
}

fn merge_thoughts(conversation: &mut Conversation, event: &ThoughtsEvent) -> MergeOutcome {
    let (message, created) = conversation.ensure_message(&event.id, Role::Assistant, event.agent);
    for thought in &event.react_thoughts {
        if !message.has_thought(&thought.thought) {
            message.react_thoughts.push(thought.clone());
        }
    }
    MergeOutcome::touched(&event.id, created, false)
}

fn merge_interrupt(conversation: &mut Conversation, event: &InterruptEvent) -> MergeOutcome {
    let (message, created) = conversation.ensure_message(&event.id, Role::Assistant, event.agent);
    message.options = Some(event.options.clone());
    let finished = finish(message, event.finish_reason.as_deref());
    MergeOutcome::touched(&event.id, created, finished)
}

/// Record a finish reason. Returns `true` when this ended the stream.
fn finish(message: &mut Message, finish_reason: Option<&str>) -> bool {
    let Some(reason) = finish_reason else {
        return false;
    };
    message.finish_reason = Some(reason.to_string());
    std::mem::replace(&mut message.is_streaming, false)
}

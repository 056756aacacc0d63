use std::collections::HashMap;

use relay_core::entities::Message;
use relay_core::enums::{AgentKind, Role};
use relay_events::ChatEvent;

use crate::merge::{MergeOutcome, merge};

/// Message state of one conversation.
///
/// Owned by exactly one writer. Besides the messages it keeps the index from
/// tool call id to owning message, and results that arrived before their call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    pub(crate) messages: HashMap<String, Message>,
    pub(crate) message_ids: Vec<String>,
    pub(crate) tool_call_owners: HashMap<String, String>,
    pub(crate) pending_results: HashMap<String, String>,
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one event. See [`merge()`].
    pub fn merge(&mut self, event: &ChatEvent) -> MergeOutcome {
        merge(self, event)
    }

    #[must_use]
    pub fn message(&self, id: &str) -> Option<&Message> {
        self.messages.get(id)
    }

    /// Message ids in arrival order.
    #[must_use]
    pub fn message_ids(&self) -> &[String] {
        &self.message_ids
    }

    pub fn messages_in_order(&self) -> impl Iterator<Item = &Message> {
        self.message_ids.iter().filter_map(|id| self.messages.get(id))
    }

    /// The last `n` messages, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &Message> {
        let start = self.message_ids.len().saturating_sub(n);
        self.message_ids[start..]
            .iter()
            .filter_map(|id| self.messages.get(id))
    }

    /// Arrival position of a message.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.message_ids.iter().position(|m| m == id)
    }

    /// Id of the message that owns a tool call.
    #[must_use]
    pub fn owner_of(&self, tool_call_id: &str) -> Option<&str> {
        self.tool_call_owners.get(tool_call_id).map(String::as_str)
    }

    /// Results waiting for their tool call to appear.
    #[must_use]
    pub fn pending_result_count(&self) -> usize {
        self.pending_results.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.message_ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.message_ids.is_empty()
    }

    /// Add an optimistic user turn. Returns `false` if the id is taken.
    pub fn append_user_message(&mut self, id: &str, content: &str) -> bool {
        if self.messages.contains_key(id) {
            tracing::debug!(message_id = %id, "user message id already present");
            return false;
        }
        self.message_ids.push(id.to_string());
        self.messages
            .insert(id.to_string(), Message::user(id, content));
        true
    }

    /// Record the option the user picked for an interrupt and clear the
    /// options. Returns `false` if the message does not exist.
    pub fn answer_interrupt(&mut self, message_id: &str, value: &str) -> bool {
        let Some(message) = self.messages.get_mut(message_id) else {
            return false;
        };
        message.interrupt_feedback = Some(value.to_string());
        message.options = None;
        true
    }

    /// Mark every still-streaming message finished. Returns their ids in
    /// arrival order.
    pub fn finalize_streaming(&mut self) -> Vec<String> {
        let mut finalized = Vec::new();
        for id in &self.message_ids {
            if let Some(message) = self.messages.get_mut(id)
                && message.is_streaming
            {
                message.is_streaming = false;
                finalized.push(id.clone());
            }
        }
        finalized
    }

    /// Get or lazily create a message. The flag is `true` when created.
    pub(crate) fn ensure_message(
        &mut self,
        id: &str,
        role: Role,
        agent: Option<AgentKind>,
    ) -> (&mut Message, bool) {
        let created = !self.messages.contains_key(id);
        if created {
            tracing::debug!(message_id = %id, agent = ?agent, "creating message");
            self.message_ids.push(id.to_string());
        }
        let message = self
            .messages
            .entry(id.to_string())
            .or_insert_with(|| Message::streaming(id, role, agent));
        if message.agent.is_none() {
            message.agent = agent;
        }
        (message, created)
    }

    /// Index newly seen tool call ids of `message_id` and hand them any
    /// buffered results.
    pub(crate) fn index_tool_calls(&mut self, message_id: &str, call_ids: &[String]) {
        for call_id in call_ids {
            let owner = self
                .tool_call_owners
                .entry(call_id.clone())
                .or_insert_with(|| message_id.to_string())
                .clone();

            let Some(result) = self.pending_results.remove(call_id) else {
                continue;
            };
            if let Some(call) = self
                .messages
                .get_mut(&owner)
                .and_then(|m| m.tool_calls.iter_mut().find(|c| &c.id == call_id))
                && call.result.is_none()
            {
                tracing::debug!(tool_call_id = %call_id, message_id = %owner, "applying buffered tool result");
                call.result = Some(result);
            }
        }
    }
}

use std::sync::Arc;

use relay_config::RelayConfig;
use relay_core::entities::Thought;
use relay_core::enums::EscalationTrigger;
use relay_events::ChatEvent;
use relay_merge::{MergeOutcome, ThoughtAggregator};
use relay_router::{FollowUpAssessor, FollowUpVerdict};
use tokio::sync::watch;

use crate::error::StoreError;
use crate::state::{ArmedEscalation, StoreState};

/// The single writer for one conversation.
#[derive(Debug)]
pub struct ChatStore {
    state: StoreState,
    aggregator: ThoughtAggregator,
    assessor: FollowUpAssessor,
    snapshots: watch::Sender<Arc<StoreState>>,
}

impl Default for ChatStore {
    fn default() -> Self {
        Self::new(&RelayConfig::default())
    }
}

impl ChatStore {
    #[must_use]
    pub fn new(config: &RelayConfig) -> Self {
        let (snapshots, _) = watch::channel(Arc::new(StoreState::default()));
        Self {
            state: StoreState::default(),
            aggregator: ThoughtAggregator::new(&config.merge),
            assessor: FollowUpAssessor::new(&config.router),
            snapshots,
        }
    }

    /// Replace the follow-up assessor (e.g. to plug in a classifier).
    #[must_use]
    pub fn with_assessor(mut self, assessor: FollowUpAssessor) -> Self {
        self.assessor = assessor;
        self
    }

    #[must_use]
    pub const fn state(&self) -> &StoreState {
        &self.state
    }

    /// Receive a snapshot after every transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<StoreState>> {
        self.snapshots.subscribe()
    }

    /// Merge one event and update the derived maps, as a single transition.
    pub fn dispatch(&mut self, event: &ChatEvent) -> MergeOutcome {
        let outcome = self.state.conversation.merge(event);
        if let Some(message_id) = outcome.message_id.as_deref() {
            let escalated_from = match event {
                ChatEvent::MessageChunk(chunk) => chunk.escalated_from.as_deref(),
                _ => None,
            };
            self.state.track(message_id, &outcome, escalated_from);
        }
        self.publish();
        outcome
    }

    /// Add an optimistic user turn.
    ///
    /// When the previous block was a ReAct block, the reply is assessed; a
    /// verdict that escalates arms a link to the next planner block.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateMessage` if the id is already used.
    pub fn append_user_message(
        &mut self,
        id: &str,
        content: &str,
    ) -> Result<Option<FollowUpVerdict>, StoreError> {
        let react_block = self.state.last_react_block().map(String::from);
        let previous_answer = react_block
            .as_deref()
            .and_then(|block| self.state.research_report_ids.get(block))
            .and_then(|report| self.state.message(report))
            .map(|m| m.content.clone())
            .unwrap_or_default();

        if !self.state.conversation.append_user_message(id, content) {
            return Err(StoreError::DuplicateMessage(id.to_string()));
        }
        self.state.end_turn();

        let verdict = react_block.map(|block| {
            let verdict = self.assessor.assess(&previous_answer, content);
            self.state.armed_escalation = verdict.escalates().then(|| {
                tracing::info!(research_id = %block, ?verdict, "follow-up armed escalation");
                ArmedEscalation {
                    react_block_id: block,
                    trigger: EscalationTrigger::UserDissatisfied,
                }
            });
            verdict
        });
        if verdict.is_none() {
            self.state.armed_escalation = None;
        }

        self.publish();
        Ok(verdict)
    }

    /// Record the user's answer to an interrupt.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Core(NotFound)` if the message does not exist.
    pub fn answer_interrupt(&mut self, message_id: &str, value: &str) -> Result<(), StoreError> {
        if !self.state.conversation.answer_interrupt(message_id, value) {
            return Err(StoreError::not_found("message", message_id));
        }
        self.publish();
        Ok(())
    }

    /// Expand a research block. UI state only.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Core(NotFound)` for an unknown block.
    pub fn open_research(&mut self, research_id: &str) -> Result<(), StoreError> {
        if !self.state.research_ids.iter().any(|id| id == research_id) {
            return Err(StoreError::not_found("research", research_id));
        }
        self.state.open_research_id = Some(research_id.to_string());
        self.publish();
        Ok(())
    }

    pub fn close_research(&mut self) {
        self.state.open_research_id = None;
        self.publish();
    }

    pub fn set_responding(&mut self, responding: bool) {
        self.state.responding = responding;
        self.publish();
    }

    /// Mark every still-streaming message finished. Returns their ids.
    pub fn finalize_streaming(&mut self) -> Vec<String> {
        let finalized = self.state.conversation.finalize_streaming();
        self.publish();
        finalized
    }

    /// Ordered, deduplicated thoughts for a research block.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Core(NotFound)` for an unknown block.
    pub fn thoughts(&self, research_id: &str) -> Result<Vec<Thought>, StoreError> {
        let sources = self
            .state
            .block_sources(research_id)
            .ok_or_else(|| StoreError::not_found("research", research_id))?;
        Ok(self.aggregator.collect(&self.state.conversation, &sources))
    }

    fn publish(&self) {
        self.snapshots.send_replace(Arc::new(self.state.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use relay_events::decode;

    fn event(name: &str, data: &str) -> ChatEvent {
        decode(name, data).unwrap().unwrap()
    }

    #[test]
    fn every_dispatch_publishes_a_snapshot() {
        let mut store = ChatStore::default();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store.dispatch(&event("message_chunk", r#"{"id":"1","agent":"react_agent","content":"hi"}"#));
        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.message("1").unwrap().content, "hi");

        // Later transitions never alter an already published snapshot.
        store.dispatch(&event("message_chunk", r#"{"id":"1","content":" there"}"#));
        assert_eq!(snapshot.message("1").unwrap().content, "hi");
        assert_eq!(rx.borrow().message("1").unwrap().content, "hi there");
    }

    #[test]
    fn open_and_close_research() {
        let mut store = ChatStore::default();
        store.dispatch(&event("message_chunk", r#"{"id":"p","agent":"planner","content":"{"}"#));
        store.close_research();
        assert_eq!(store.state().open_research_id, None);

        store.open_research("p").unwrap();
        assert_eq!(store.state().open_research_id.as_deref(), Some("p"));
        assert!(matches!(
            store.open_research("nope"),
            Err(StoreError::Core(relay_core::errors::CoreError::NotFound { .. }))
        ));
    }

    #[test]
    fn duplicate_user_message_is_rejected() {
        let mut store = ChatStore::default();
        store.append_user_message("u-1", "hello").unwrap();
        assert!(matches!(
            store.append_user_message("u-1", "again"),
            Err(StoreError::DuplicateMessage(id)) if id == "u-1"
        ));
    }

    #[test]
    fn answer_interrupt_records_feedback() {
        let mut store = ChatStore::default();
        store.dispatch(&event(
            "interrupt",
            r#"{"id":"p","agent":"planner","options":[{"text":"Start","value":"accepted"}],"finish_reason":"interrupt"}"#,
        ));
        assert_eq!(store.state().last_interrupt_message().unwrap().id, "p");

        store.answer_interrupt("p", "accepted").unwrap();
        assert!(store.state().last_interrupt_message().is_none());
        assert_eq!(
            store.state().message("p").unwrap().interrupt_feedback.as_deref(),
            Some("accepted")
        );
        assert!(store.answer_interrupt("missing", "accepted").is_err());
    }

    #[test]
    fn thoughts_for_unknown_block_is_not_found() {
        let store = ChatStore::default();
        assert!(store.thoughts("nope").is_err());
    }
}

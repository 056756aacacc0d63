//! The store's state and its research block bookkeeping.

use std::collections::HashMap;

use relay_core::entities::{EscalationLink, Message};
use relay_core::enums::{AgentKind, EscalationTrigger, Role};
use relay_merge::{BlockSources, Conversation, MergeOutcome};

/// A follow-up that asked for the full pipeline. The next planner block is
/// linked to `react_block_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmedEscalation {
    pub react_block_id: String,
    pub trigger: EscalationTrigger,
}

/// Everything a reader can see. Published as an immutable snapshot after
/// each store transition.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub(crate) conversation: Conversation,
    /// Research block ids in the order the blocks started.
    pub research_ids: Vec<String>,
    pub research_plan_ids: HashMap<String, String>,
    pub research_activity_ids: HashMap<String, Vec<String>>,
    pub research_report_ids: HashMap<String, String>,
    /// Keyed by the ReAct block id.
    pub react_to_planner_escalation: HashMap<String, EscalationLink>,
    pub ongoing_research_id: Option<String>,
    pub open_research_id: Option<String>,
    pub responding: bool,
    pub armed_escalation: Option<ArmedEscalation>,
    research_by_message: HashMap<String, String>,
}

impl StoreState {
    #[must_use]
    pub const fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    #[must_use]
    pub fn message(&self, id: &str) -> Option<&Message> {
        self.conversation.message(id)
    }

    pub fn messages_in_order(&self) -> impl Iterator<Item = &Message> {
        self.conversation.messages_in_order()
    }

    /// The block a message belongs to.
    #[must_use]
    pub fn research_of(&self, message_id: &str) -> Option<&str> {
        self.research_by_message.get(message_id).map(String::as_str)
    }

    /// Agent of the message that started a block.
    #[must_use]
    pub fn block_starter(&self, research_id: &str) -> Option<AgentKind> {
        self.conversation.message(research_id).and_then(|m| m.agent)
    }

    /// Messages of a block in arrival order.
    #[must_use]
    pub fn research_messages(&self, research_id: &str) -> Vec<&Message> {
        self.research_activity_ids
            .get(research_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.conversation.message(id))
            .collect()
    }

    /// The newest message still waiting for an interrupt answer, unless the
    /// user has spoken since.
    #[must_use]
    pub fn last_interrupt_message(&self) -> Option<&Message> {
        self.conversation
            .message_ids()
            .iter()
            .rev()
            .filter_map(|id| self.conversation.message(id))
            .take_while(|m| m.role != Role::User)
            .find(|m| m.awaits_feedback())
    }

    /// The planner message a ReAct block was handed over to.
    #[must_use]
    pub fn escalation_target(&self, react_id: &str) -> Option<&str> {
        self.react_to_planner_escalation
            .get(react_id)
            .map(|link| link.planner_message_id.as_str())
    }

    /// Sources the thought aggregator reads for a block.
    pub(crate) fn block_sources<'a>(&'a self, research_id: &'a str) -> Option<BlockSources<'a>> {
        if !self.research_ids.iter().any(|id| id == research_id) {
            return None;
        }
        Some(BlockSources {
            block_id: research_id,
            plan_id: self.research_plan_ids.get(research_id).map(String::as_str),
            activity_ids: self
                .research_activity_ids
                .get(research_id)
                .map(Vec::as_slice)
                .unwrap_or_default(),
            owners: Some(&self.research_by_message),
        })
    }

    /// Update the research maps after a merge touched `message_id`.
    pub(crate) fn track(
        &mut self,
        message_id: &str,
        outcome: &MergeOutcome,
        escalated_from: Option<&str>,
    ) {
        let Some(message) = self.conversation.message(message_id) else {
            return;
        };
        let joins = message.role == Role::Assistant
            && !self.research_by_message.contains_key(message_id);
        let agent = message.agent.filter(|a| a.joins_research());

        if joins && let Some(agent) = agent {
            self.join_research(message_id, agent, escalated_from);
        }
        if outcome.finished {
            self.close_if_answered(message_id);
        }
    }

    fn join_research(&mut self, id: &str, agent: AgentKind, escalated_from: Option<&str>) {
        let ongoing = self.ongoing_research_id.clone();
        let escalating = agent == AgentKind::Planner
            && (escalated_from.is_some()
                || ongoing
                    .as_deref()
                    .is_some_and(|block| self.is_react_block_of_current_turn(block)));

        match ongoing {
            Some(block) if !escalating => self.add_activity(&block, id, agent),
            _ => self.start_block(id, agent, escalated_from),
        }
    }

    fn start_block(&mut self, id: &str, agent: AgentKind, escalated_from: Option<&str>) {
        if agent == AgentKind::Planner
            && let Some(link) = self.escalation_for(id, escalated_from)
        {
            if self.ongoing_research_id.as_deref() == Some(link.react_message_id.as_str()) {
                tracing::info!(research_id = %link.react_message_id, "closing ReAct block on escalation");
            }
            tracing::info!(
                react = %link.react_message_id,
                planner = %id,
                trigger = ?link.trigger,
                "escalation handover"
            );
            self.react_to_planner_escalation
                .insert(link.react_message_id.clone(), link);
        }

        tracing::info!(research_id = %id, %agent, "research block started");
        self.research_ids.push(id.to_string());
        self.research_activity_ids
            .insert(id.to_string(), vec![id.to_string()]);
        self.research_by_message
            .insert(id.to_string(), id.to_string());
        self.ongoing_research_id = Some(id.to_string());
        self.open_research_id = Some(id.to_string());

        match agent {
            AgentKind::Planner => {
                self.research_plan_ids.insert(id.to_string(), id.to_string());
            }
            AgentKind::Reporter => {
                self.research_report_ids.insert(id.to_string(), id.to_string());
            }
            _ => {
                if let Some(plan_id) = self.latest_planner_since_user(id) {
                    self.research_plan_ids.insert(id.to_string(), plan_id);
                }
            }
        }
    }

    fn add_activity(&mut self, block: &str, id: &str, agent: AgentKind) {
        let activities = self
            .research_activity_ids
            .entry(block.to_string())
            .or_default();
        if !activities.iter().any(|a| a == id) {
            activities.push(id.to_string());
        }
        self.research_by_message
            .insert(id.to_string(), block.to_string());

        match agent {
            AgentKind::Planner => {
                tracing::debug!(research_id = %block, plan_id = %id, "replan");
                self.research_plan_ids
                    .insert(block.to_string(), id.to_string());
            }
            AgentKind::Reporter => {
                self.research_report_ids
                    .insert(block.to_string(), id.to_string());
            }
            _ => {}
        }
    }

    /// Decide whether a planner message starting a block takes over from a
    /// ReAct block: explicitly, because a ReAct block is still running, or
    /// because the user's follow-up armed an escalation.
    fn escalation_for(
        &mut self,
        planner_id: &str,
        escalated_from: Option<&str>,
    ) -> Option<EscalationLink> {
        let armed = self.armed_escalation.take();

        let react_block = escalated_from
            .map(|react_id| self.research_of(react_id).unwrap_or(react_id).to_string())
            .or_else(|| {
                self.ongoing_research_id
                    .clone()
                    .filter(|block| self.is_react_block_of_current_turn(block))
            })
            .or_else(|| armed.as_ref().map(|a| a.react_block_id.clone()))?;

        let trigger = armed
            .filter(|a| a.react_block_id == react_block)
            .map(|a| a.trigger);
        Some(EscalationLink {
            react_message_id: react_block,
            planner_message_id: planner_id.to_string(),
            trigger,
        })
    }

    fn latest_planner_since_user(&self, exclude: &str) -> Option<String> {
        self.conversation
            .message_ids()
            .iter()
            .rev()
            .filter(|id| *id != exclude)
            .filter_map(|id| self.conversation.message(id))
            .take_while(|m| m.role != Role::User)
            .find(|m| m.is_from(AgentKind::Planner))
            .map(|m| m.id.clone())
    }

    /// Close the ongoing block when its report, or the fast path's final
    /// answer, stops streaming.
    fn close_if_answered(&mut self, id: &str) {
        let Some(block) = self.research_by_message.get(id).cloned() else {
            return;
        };
        let Some(message) = self.conversation.message(id) else {
            return;
        };

        let fast_answer = message.is_from(AgentKind::ReactAgent)
            && message.finish_reason.as_deref() == Some("stop")
            && !message.content.trim().is_empty()
            && message.tool_calls.is_empty();
        let is_report = self
            .research_report_ids
            .get(&block)
            .is_some_and(|report| report == id);

        if fast_answer {
            self.research_report_ids.insert(block.clone(), id.to_string());
        }
        if (fast_answer || is_report) && self.ongoing_research_id.as_deref() == Some(block.as_str()) {
            tracing::info!(research_id = %block, report_id = %id, "research block closed");
            self.ongoing_research_id = None;
        }
    }

    /// A user turn ends whatever block the previous turn left running, e.g.
    /// after a cancelled or failed stream.
    pub(crate) fn end_turn(&mut self) {
        if let Some(block) = self.ongoing_research_id.take() {
            tracing::info!(research_id = %block, "research block ended by new user turn");
        }
    }

    /// A ReAct block started after the most recent user message.
    fn is_react_block_of_current_turn(&self, block: &str) -> bool {
        if self.block_starter(block) != Some(AgentKind::ReactAgent) {
            return false;
        }
        let ids = self.conversation.message_ids();
        let last_user = ids
            .iter()
            .rposition(|id| self.conversation.message(id).is_some_and(|m| m.role == Role::User));
        self.conversation
            .position(block)
            .is_some_and(|start| last_user.is_none_or(|user| start > user))
    }

    /// The most recent block, if it was started by the ReAct agent.
    pub(crate) fn last_react_block(&self) -> Option<&str> {
        self.research_ids
            .last()
            .map(String::as_str)
            .filter(|block| self.block_starter(block) == Some(AgentKind::ReactAgent))
    }
}

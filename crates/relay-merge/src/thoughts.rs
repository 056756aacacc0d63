//! Research block thought aggregation.
//!
//! Thoughts for a block come from four sources that fill in at different
//! times: the plan JSON, thoughts streamed onto the plan message, thoughts on
//! the block's activities, and a recovery scan over recent messages that
//! have not been linked into the block yet. Candidates are merged by text.
//! A duplicate keeps the smallest `(source, step_index, message_id)`, and the
//! output is sorted by `(step_index, source, message_id, text)`.
//!
//! The recovery scan selects by block membership, not by position relative
//! to the block's first message, so the result depends only on the final
//! messages. Arrival order matters only once a conversation outgrows
//! `merge.recovery_window`.

use std::collections::{HashMap, HashSet};

use relay_config::MergeConfig;
use relay_core::entities::{Message, Plan, Thought};
use relay_core::enums::AgentKind;

use crate::conversation::Conversation;

/// The messages of one research block, as tracked by the store.
#[derive(Debug, Clone, Copy)]
pub struct BlockSources<'a> {
    /// Id of the block (its triggering message).
    pub block_id: &'a str,
    pub plan_id: Option<&'a str>,
    pub activity_ids: &'a [String],
    /// Message id → block id. The recovery scan skips messages that belong
    /// to a different block.
    pub owners: Option<&'a HashMap<String, String>>,
}

/// Source priority, lowest wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Source {
    PlanStep,
    PlanMessage,
    Activity,
    Recovery,
}

#[derive(Debug)]
struct Candidate {
    source: Source,
    thought: Thought,
}

impl Candidate {
    fn dedup_key(&self) -> (Source, u32, &str) {
        (self.source, self.thought.step_index, &self.thought.message_id)
    }
}

/// Builds the thought list for a research block.
#[derive(Debug, Clone, Copy)]
pub struct ThoughtAggregator {
    recovery_window: usize,
}

impl Default for ThoughtAggregator {
    fn default() -> Self {
        Self::new(&MergeConfig::default())
    }
}

impl ThoughtAggregator {
    #[must_use]
    pub const fn new(config: &MergeConfig) -> Self {
        Self {
            recovery_window: config.recovery_window,
        }
    }

    /// Ordered, deduplicated thoughts for one block.
    #[must_use]
    pub fn collect(&self, conversation: &Conversation, block: &BlockSources<'_>) -> Vec<Thought> {
        let mut candidates = Vec::new();
        let mut covered: HashSet<&str> = HashSet::new();

        if let Some(plan_message) = block.plan_id.and_then(|id| conversation.message(id)) {
            covered.insert(&plan_message.id);
            candidates.extend(plan_step_thoughts(plan_message));
            candidates.extend(message_thoughts(plan_message, Source::PlanMessage));
        }

        for message in block
            .activity_ids
            .iter()
            .filter_map(|id| conversation.message(id))
        {
            covered.insert(&message.id);
            candidates.extend(message_thoughts(message, Source::Activity));
        }

        for message in self.recovery_scan(conversation, block) {
            if covered.insert(&message.id) {
                candidates.extend(message_thoughts(message, Source::Recovery));
            }
        }

        converge(candidates)
    }

    /// Recent thought-emitting messages not claimed by another block.
    fn recovery_scan<'c>(
        &self,
        conversation: &'c Conversation,
        block: &BlockSources<'_>,
    ) -> impl Iterator<Item = &'c Message> {
        let ids = conversation.message_ids();
        let window_start = ids.len().saturating_sub(self.recovery_window);
        let owners = block.owners;
        let block_id = block.block_id.to_string();

        ids[window_start..]
            .iter()
            .filter_map(|id| conversation.message(id))
            .filter(|m| m.agent.is_some_and(AgentKind::emits_thoughts))
            .filter(move |m| {
                owners
                    .and_then(|owners| owners.get(&m.id))
                    .is_none_or(|owner| *owner == block_id)
            })
    }
}

fn plan_step_thoughts(plan_message: &Message) -> Vec<Candidate> {
    let plan = match Plan::parse(&plan_message.content) {
        Ok(plan) => plan,
        Err(error) => {
            tracing::debug!(message_id = %plan_message.id, %error, "plan not parseable yet");
            return Vec::new();
        }
    };

    plan.steps
        .iter()
        .enumerate()
        .filter(|(_, step)| !step.description.trim().is_empty())
        .map(|(index, step)| Candidate {
            source: Source::PlanStep,
            thought: Thought {
                thought: step.description.clone(),
                before_tool: true,
                step_index: u32::try_from(index).unwrap_or(u32::MAX),
                message_id: plan_message.id.clone(),
                agent: Some(AgentKind::Planner),
            },
        })
        .collect()
}

fn message_thoughts(message: &Message, source: Source) -> impl Iterator<Item = Candidate> + '_ {
    message.react_thoughts.iter().map(move |t| Candidate {
        source,
        thought: Thought {
            thought: t.thought.clone(),
            before_tool: t.before_tool,
            step_index: t.step_index,
            message_id: message.id.clone(),
            agent: message.agent,
        },
    })
}

fn converge(candidates: Vec<Candidate>) -> Vec<Thought> {
    let mut by_text: HashMap<String, Candidate> = HashMap::new();
    for candidate in candidates {
        match by_text.get(&candidate.thought.thought) {
            Some(existing) if existing.dedup_key() <= candidate.dedup_key() => {}
            _ => {
                by_text.insert(candidate.thought.thought.clone(), candidate);
            }
        }
    }

    let mut kept: Vec<Candidate> = by_text.into_values().collect();
    kept.sort_by(|a, b| {
        (a.thought.step_index, a.source, &a.thought.message_id, &a.thought.thought).cmp(&(
            b.thought.step_index,
            b.source,
            &b.thought.message_id,
            &b.thought.thought,
        ))
    });
    kept.into_iter().map(|c| c.thought).collect()
}

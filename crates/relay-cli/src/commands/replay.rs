use relay_config::RelayConfig;
use relay_core::entities::EscalationLink;
use relay_core::enums::{AgentKind, Role};
use relay_store::{ConsumeSummary, StoreState};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ReplayArgs;
use crate::commands::shared;
use crate::output::output;

const PREVIEW_CHARS: usize = 80;

#[derive(Debug, Serialize)]
pub struct ReplayReport {
    #[serde(flatten)]
    pub summary: ConsumeSummary,
    pub messages: Vec<MessageRow>,
    pub research: Vec<ResearchRow>,
    pub escalations: Vec<EscalationLink>,
}

#[derive(Debug, Serialize)]
pub struct MessageRow {
    pub id: String,
    pub role: Role,
    pub agent: Option<AgentKind>,
    pub research: Option<String>,
    pub state: &'static str,
    pub tool_calls: usize,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ResearchRow {
    pub id: String,
    pub starter: Option<AgentKind>,
    pub plan: Option<String>,
    pub report: Option<String>,
    pub activities: usize,
    pub status: &'static str,
    pub escalated_from: Option<String>,
}

pub async fn handle(
    args: &ReplayArgs,
    config: &RelayConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let (store, summary) = shared::replay(&args.file, config).await?;
    output(&build_report(store.state(), summary), flags.format)
}

pub fn build_report(state: &StoreState, summary: ConsumeSummary) -> ReplayReport {
    let messages = state
        .messages_in_order()
        .map(|message| MessageRow {
            id: message.id.clone(),
            role: message.role,
            agent: message.agent,
            research: state.research_of(&message.id).map(str::to_string),
            state: if message.is_streaming { "streaming" } else { "done" },
            tool_calls: message.tool_calls.len(),
            content: preview(&message.content),
        })
        .collect();

    let research = state
        .research_ids
        .iter()
        .map(|id| ResearchRow {
            id: id.clone(),
            starter: state.block_starter(id),
            plan: state.research_plan_ids.get(id).cloned(),
            report: state.research_report_ids.get(id).cloned(),
            activities: state.research_activity_ids.get(id).map_or(0, Vec::len),
            status: if state.ongoing_research_id.as_ref() == Some(id) {
                "ongoing"
            } else {
                "done"
            },
            escalated_from: state
                .react_to_planner_escalation
                .values()
                .find(|link| &link.planner_message_id == id)
                .map(|link| link.react_message_id.clone()),
        })
        .collect();

    let mut escalations = state
        .react_to_planner_escalation
        .values()
        .cloned()
        .collect::<Vec<_>>();
    escalations.sort_by(|a, b| a.react_message_id.cmp(&b.react_message_id));

    ReplayReport {
        summary,
        messages,
        research,
        escalations,
    }
}

fn preview(content: &str) -> String {
    match content.char_indices().nth(PREVIEW_CHARS) {
        Some((end, _)) => format!("{}...", &content[..end]),
        None => content.to_string(),
    }
}

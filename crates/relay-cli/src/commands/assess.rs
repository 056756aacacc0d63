use relay_config::RelayConfig;
use relay_router::{FollowUpAssessor, FollowUpVerdict};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AssessArgs;
use crate::output::output;

#[derive(Debug, Serialize)]
pub struct AssessReport {
    pub escalates: bool,
    #[serde(flatten)]
    pub verdict: FollowUpVerdict,
}

pub fn handle(args: &AssessArgs, config: &RelayConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&assess(args, config), flags.format)
}

fn assess(args: &AssessArgs, config: &RelayConfig) -> AssessReport {
    let verdict = FollowUpAssessor::new(&config.router).assess(&args.answer, &args.text);
    AssessReport {
        escalates: verdict.escalates(),
        verdict,
    }
}

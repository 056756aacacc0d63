//! The validate/reflect loop is bounded by the replan budget.

use pretty_assertions::assert_eq;
use relay_config::RouterConfig;
use relay_core::enums::EscalationTrigger;
use relay_router::{PipelineRun, PipelineStage, StageOutcome};
use rstest::rstest;

fn reject(run: PipelineRun) -> PipelineRun {
    run.advance(StageOutcome::PlanReady)
        .and_then(|r| r.advance(StageOutcome::StepsDone))
        .and_then(|r| {
            r.advance(StageOutcome::Rejected {
                reason: "burndown missing sprint 5".into(),
            })
        })
        .unwrap()
}

fn planning(max_replans: u32) -> PipelineRun {
    let config = RouterConfig {
        max_replans,
        ..RouterConfig::default()
    };
    PipelineRun::fast_path(&config)
        .advance(StageOutcome::Escalate(EscalationTrigger::UserDissatisfied))
        .and_then(|r| r.advance(StageOutcome::Plan))
        .unwrap()
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(3)]
fn exhaustion_fails_after_exactly_max_replans(#[case] max_replans: u32) {
    let mut run = planning(max_replans);
    for used in 1..=max_replans {
        run = reject(run).advance(StageOutcome::Plan).unwrap();
        assert_eq!(run.stage(), PipelineStage::Planning);
        assert_eq!(run.replans_used(), used);
    }

    let run = reject(run).advance(StageOutcome::Plan).unwrap();
    assert_eq!(run.stage(), PipelineStage::Failed);
    assert_eq!(run.replans_used(), max_replans);
    let message = run.failure_message().unwrap();
    assert!(message.contains("burndown missing sprint 5"));

    // A failed run is terminal.
    assert!(run.advance(StageOutcome::Plan).is_err());
}

#[test]
fn full_pipeline_history() {
    let run = planning(3);
    let run = reject(run).advance(StageOutcome::Plan).unwrap();
    let run = run
        .advance(StageOutcome::PlanReady)
        .and_then(|r| r.advance(StageOutcome::StepsDone))
        .and_then(|r| r.advance(StageOutcome::Passed))
        .and_then(|r| r.advance(StageOutcome::Answered))
        .unwrap();

    use PipelineStage::*;
    assert_eq!(
        run.history(),
        &[
            FastPath, Escalated, Planning, Executing, Validating, Reflecting, Planning, Executing,
            Validating, Reporting, Succeeded,
        ]
    );
    assert_eq!(run.replans_used(), 1);
}

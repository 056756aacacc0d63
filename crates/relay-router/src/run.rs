//! One request's path through the pipeline.

use relay_config::RouterConfig;
use relay_core::entities::EscalationLink;
use relay_core::enums::EscalationTrigger;

use crate::budget::ReplanBudget;
use crate::error::RouterError;
use crate::stage::PipelineStage;

/// What the current stage produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// A final answer was delivered (fast path or report).
    Answered,
    /// The fast path gave up.
    Escalate(EscalationTrigger),
    /// Hand the request to the planner. From `reflecting` this spends one
    /// replan.
    Plan,
    PlanReady,
    StepsDone,
    /// The validator accepted the step outputs.
    Passed,
    /// The validator rejected the step outputs.
    Rejected { reason: String },
    /// Stop with a terminal failure.
    Abort { reason: String },
}

impl StageOutcome {
    const fn target(&self) -> PipelineStage {
        match self {
            Self::Answered => PipelineStage::Succeeded,
            Self::Escalate(_) => PipelineStage::Escalated,
            Self::Plan => PipelineStage::Planning,
            Self::PlanReady => PipelineStage::Executing,
            Self::StepsDone => PipelineStage::Validating,
            Self::Passed => PipelineStage::Reporting,
            Self::Rejected { .. } => PipelineStage::Reflecting,
            Self::Abort { .. } => PipelineStage::Failed,
        }
    }
}

/// The state of one request, moved through [`PipelineRun::advance`].
///
/// The run owns the [`ReplanBudget`]. Stages never share it: each `advance`
/// consumes the run and returns the next one.
#[derive(Debug)]
pub struct PipelineRun {
    stage: PipelineStage,
    budget: ReplanBudget,
    trigger: Option<EscalationTrigger>,
    last_rejection: Option<String>,
    failure: Option<String>,
    history: Vec<PipelineStage>,
}

impl PipelineRun {
    /// A run starting on the fast ReAct path.
    #[must_use]
    pub fn fast_path(config: &RouterConfig) -> Self {
        Self {
            stage: PipelineStage::FastPath,
            budget: ReplanBudget::new(config.max_replans),
            trigger: None,
            last_rejection: None,
            failure: None,
            history: vec![PipelineStage::FastPath],
        }
    }

    #[must_use]
    pub const fn stage(&self) -> PipelineStage {
        self.stage
    }

    #[must_use]
    pub const fn trigger(&self) -> Option<EscalationTrigger> {
        self.trigger
    }

    #[must_use]
    pub const fn replans_used(&self) -> u32 {
        self.budget.used()
    }

    /// Every stage the run has been in, oldest first.
    #[must_use]
    pub fn history(&self) -> &[PipelineStage] {
        &self.history
    }

    /// The message shown to the user when the run ended in `failed`.
    #[must_use]
    pub fn failure_message(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Apply a stage outcome.
    ///
    /// # Errors
    ///
    /// Returns `RouterError::InvalidTransition` if the outcome leads to a
    /// stage the current one cannot move to. An exhausted replan budget is
    /// not an error: the run moves to `failed` with a failure message.
    pub fn advance(mut self, outcome: StageOutcome) -> Result<Self, RouterError> {
        let from = self.stage;
        let mut to = outcome.target();
        if !from.can_transition_to(to) {
            return Err(RouterError::InvalidTransition { from, to });
        }

        match outcome {
            StageOutcome::Escalate(trigger) => self.trigger = Some(trigger),
            StageOutcome::Rejected { reason } => self.last_rejection = Some(reason),
            StageOutcome::Abort { reason } => self.failure = Some(format!("The request could not be completed: {reason}")),
            StageOutcome::Plan if from == PipelineStage::Reflecting => match self.budget.spend() {
                Ok(budget) => {
                    self.budget = budget;
                    tracing::debug!(used = self.budget.used(), max = self.budget.max(), "replanning");
                }
                Err(budget) => {
                    self.budget = budget;
                    self.failure = Some(self.exhausted_message());
                    to = PipelineStage::Failed;
                }
            },
            _ => {}
        }

        tracing::debug!(%from, %to, "pipeline transition");
        self.stage = to;
        self.history.push(to);
        Ok(self)
    }

    /// The link the pipeline announces when a planner message takes over
    /// from a ReAct message.
    #[must_use]
    pub fn handover(&self, react_message_id: &str, planner_message_id: &str) -> EscalationLink {
        EscalationLink {
            react_message_id: react_message_id.to_string(),
            planner_message_id: planner_message_id.to_string(),
            trigger: self.trigger,
        }
    }

    fn exhausted_message(&self) -> String {
        let revisions = self.budget.max();
        let plural = if revisions == 1 { "" } else { "s" };
        match &self.last_rejection {
            Some(reason) => format!(
                "Stopped after {revisions} plan revision{plural} without passing validation. Last issue: {reason}"
            ),
            None => format!("Stopped after {revisions} plan revision{plural} without passing validation."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn escalated() -> PipelineRun {
        PipelineRun::fast_path(&RouterConfig::default())
            .advance(StageOutcome::Escalate(EscalationTrigger::RepeatedToolErrors))
            .unwrap()
            .advance(StageOutcome::Plan)
            .unwrap()
    }

    #[test]
    fn fast_answer_succeeds() {
        let run = PipelineRun::fast_path(&RouterConfig::default())
            .advance(StageOutcome::Answered)
            .unwrap();
        assert_eq!(run.stage(), PipelineStage::Succeeded);
        assert!(run.failure_message().is_none());
    }

    #[test]
    fn planning_from_escalation_is_free() {
        let run = escalated();
        assert_eq!(run.stage(), PipelineStage::Planning);
        assert_eq!(run.replans_used(), 0);
        assert_eq!(run.trigger(), Some(EscalationTrigger::RepeatedToolErrors));
    }

    #[test]
    fn skipping_validation_is_rejected() {
        let err = escalated()
            .advance(StageOutcome::PlanReady)
            .unwrap()
            .advance(StageOutcome::Passed)
            .unwrap_err();
        assert_eq!(
            err,
            RouterError::InvalidTransition {
                from: PipelineStage::Executing,
                to: PipelineStage::Reporting,
            }
        );
    }

    #[test]
    fn fast_path_cannot_plan_without_escalating() {
        let err = PipelineRun::fast_path(&RouterConfig::default())
            .advance(StageOutcome::Plan)
            .unwrap_err();
        assert!(matches!(err, RouterError::InvalidTransition { to: PipelineStage::Planning, .. }));
    }

    #[test]
    fn abort_sets_failure_message() {
        let run = escalated()
            .advance(StageOutcome::Abort {
                reason: "no project selected".into(),
            })
            .unwrap();
        assert_eq!(run.stage(), PipelineStage::Failed);
        assert!(run.failure_message().unwrap().contains("no project selected"));
    }

    #[test]
    fn handover_carries_trigger() {
        let link = escalated().handover("react-1", "plan-1");
        assert_eq!(link.react_message_id, "react-1");
        assert_eq!(link.planner_message_id, "plan-1");
        assert_eq!(link.trigger, Some(EscalationTrigger::RepeatedToolErrors));
    }
}

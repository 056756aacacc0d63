//! Fast-path escalation detection.

use std::collections::VecDeque;

use relay_config::RouterConfig;
use relay_core::enums::EscalationTrigger;
use serde_json::Value;

/// Reasoning phrases that mean the agent wants a plan instead of more tool calls.
const PLANNING_CUES: &[&str] = &[
    "need a plan",
    "needs a plan",
    "create a plan",
    "requires planning",
    "need to plan",
    "multi-step analysis",
    "too complex",
    "escalate",
];

/// Outcome of one tool execution on the fast path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolAttempt {
    Succeeded,
    Failed,
}

/// Routing hint carried in a tool result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolSignal {
    None,
    /// The tool reported that the request needs more than one step.
    Complex { reason: Option<String> },
}

impl ToolSignal {
    /// Read the hint from a tool result. A JSON object with
    /// `"needs_planning": true` or `"complexity": "high"` is complex;
    /// anything else, including non-JSON text, carries no hint.
    #[must_use]
    pub fn from_result(result: &str) -> Self {
        let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(result) else {
            return Self::None;
        };
        let needs_planning = fields.get("needs_planning").and_then(Value::as_bool) == Some(true);
        let high = fields
            .get("complexity")
            .and_then(Value::as_str)
            .is_some_and(|c| c.eq_ignore_ascii_case("high"));
        if needs_planning || high {
            let reason = fields
                .get("reason")
                .and_then(Value::as_str)
                .map(String::from);
            Self::Complex { reason }
        } else {
            Self::None
        }
    }
}

/// Watches one fast ReAct run for a reason to escalate.
///
/// Every `record_*`/`observe_*` call returns the trigger once there is one.
/// The first trigger sticks.
#[derive(Debug, Clone)]
pub struct FastPathMonitor {
    attempts: VecDeque<ToolAttempt>,
    error_window: usize,
    error_threshold: usize,
    iterations: u32,
    max_iterations: u32,
    triggered: Option<EscalationTrigger>,
}

impl FastPathMonitor {
    #[must_use]
    pub fn new(config: &RouterConfig) -> Self {
        let error_window = config.error_window as usize;
        Self {
            attempts: VecDeque::with_capacity(error_window),
            error_window,
            error_threshold: config.error_threshold as usize,
            iterations: 0,
            max_iterations: config.max_react_iterations,
            triggered: None,
        }
    }

    #[must_use]
    pub const fn triggered(&self) -> Option<EscalationTrigger> {
        self.triggered
    }

    #[must_use]
    pub const fn is_escalated(&self) -> bool {
        self.triggered.is_some()
    }

    #[must_use]
    pub const fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Record a tool execution. Escalates when the failures among the last
    /// `error_window` attempts reach `error_threshold`.
    pub fn record_tool_attempt(&mut self, attempt: ToolAttempt) -> Option<EscalationTrigger> {
        while self.attempts.len() >= self.error_window.max(1) {
            self.attempts.pop_front();
        }
        self.attempts.push_back(attempt);

        let failures = self
            .attempts
            .iter()
            .filter(|a| **a == ToolAttempt::Failed)
            .count();
        if failures >= self.error_threshold {
            return self.trigger(EscalationTrigger::RepeatedToolErrors);
        }
        self.triggered
    }

    /// Record one ReAct loop iteration.
    pub fn record_iteration(&mut self) -> Option<EscalationTrigger> {
        self.iterations = self.iterations.saturating_add(1);
        if self.iterations >= self.max_iterations {
            return self.trigger(EscalationTrigger::IterationBudgetExhausted);
        }
        self.triggered
    }

    /// Inspect the agent's reasoning text for a request to plan.
    pub fn observe_reasoning(&mut self, text: &str) -> Option<EscalationTrigger> {
        let lower = text.to_lowercase();
        if let Some(cue) = PLANNING_CUES.iter().find(|cue| lower.contains(*cue)) {
            tracing::debug!(cue, "reasoning asked for planning");
            return self.trigger(EscalationTrigger::PlanningRequested);
        }
        self.triggered
    }

    pub fn observe_tool_signal(&mut self, signal: &ToolSignal) -> Option<EscalationTrigger> {
        match signal {
            ToolSignal::Complex { reason } => {
                tracing::debug!(reason = reason.as_deref().unwrap_or(""), "tool reported complexity");
                self.trigger(EscalationTrigger::ComplexitySignal)
            }
            ToolSignal::None => self.triggered,
        }
    }

    fn trigger(&mut self, trigger: EscalationTrigger) -> Option<EscalationTrigger> {
        if self.triggered.is_none() {
            tracing::info!(%trigger, "fast path escalating");
            self.triggered = Some(trigger);
        }
        self.triggered
    }
}

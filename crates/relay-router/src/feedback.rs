//! Follow-up assessment: does the user's reply to a fast answer ask for the
//! full pipeline?

use std::fmt;

use relay_config::RouterConfig;
use serde::Serialize;

const DISSATISFACTION_CUES: &[&str] = &[
    "not what i",
    "that's wrong",
    "that is wrong",
    "incorrect",
    "doesn't answer",
    "does not answer",
    "not helpful",
    "useless",
    "try again",
    "not enough",
    "missing",
    "wrong",
];

const DETAIL_CUES: &[&str] = &[
    "more detail",
    "in detail",
    "elaborate",
    "dig deeper",
    "deeper",
    "break it down",
    "breakdown",
    "full analysis",
    "analyze",
    "analyse",
    "comprehensive",
    "step by step",
    "explain why",
    "compare",
    "report",
    "why",
];

const SATISFACTION_CUES: &[&str] = &[
    "thanks",
    "thank you",
    "thx",
    "perfect",
    "great",
    "got it",
    "that helps",
    "ok",
    "okay",
    "cool",
    "awesome",
];

/// Second opinion for short replies the keyword lists cannot place.
pub trait FollowUpClassifier: Send + Sync {
    /// Whether `reply` asks for more than `previous_answer` gave.
    fn wants_more(&self, previous_answer: &str, reply: &str) -> bool;
}

/// What the assessor concluded and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum FollowUpVerdict {
    Dissatisfied { cue: String },
    NeedsDetail { cue: String },
    Satisfied { cue: String },
    Classified { escalate: bool },
    NoSignal,
}

impl FollowUpVerdict {
    #[must_use]
    pub const fn escalates(&self) -> bool {
        match self {
            Self::Dissatisfied { .. } | Self::NeedsDetail { .. } => true,
            Self::Classified { escalate } => *escalate,
            Self::Satisfied { .. } | Self::NoSignal => false,
        }
    }
}

/// Keyword heuristics with an optional classifier fallback.
pub struct FollowUpAssessor {
    short_reply_words: usize,
    classifier: Option<Box<dyn FollowUpClassifier>>,
}

impl fmt::Debug for FollowUpAssessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FollowUpAssessor")
            .field("short_reply_words", &self.short_reply_words)
            .field("classifier", &self.classifier.is_some())
            .finish()
    }
}

impl Default for FollowUpAssessor {
    fn default() -> Self {
        Self::new(&RouterConfig::default())
    }
}

impl FollowUpAssessor {
    #[must_use]
    pub const fn new(config: &RouterConfig) -> Self {
        Self {
            short_reply_words: config.short_reply_words,
            classifier: None,
        }
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: impl FollowUpClassifier + 'static) -> Self {
        self.classifier = Some(Box::new(classifier));
        self
    }

    /// Assess a reply to a fast-path answer.
    ///
    /// Dissatisfaction and detail cues win over satisfaction cues. A short
    /// reply with no cue goes to the classifier; without one it is not
    /// escalated.
    #[must_use]
    pub fn assess(&self, previous_answer: &str, reply: &str) -> FollowUpVerdict {
        let lower = reply.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|w| !w.is_empty())
            .collect();

        if let Some(cue) = find_cue(&lower, &words, DISSATISFACTION_CUES) {
            return FollowUpVerdict::Dissatisfied { cue: cue.to_string() };
        }
        if let Some(cue) = find_cue(&lower, &words, DETAIL_CUES) {
            return FollowUpVerdict::NeedsDetail { cue: cue.to_string() };
        }
        if let Some(cue) = find_cue(&lower, &words, SATISFACTION_CUES) {
            return FollowUpVerdict::Satisfied { cue: cue.to_string() };
        }

        if words.len() <= self.short_reply_words
            && let Some(classifier) = &self.classifier
        {
            let escalate = classifier.wants_more(previous_answer, reply);
            tracing::debug!(escalate, "classifier assessed short follow-up");
            return FollowUpVerdict::Classified { escalate };
        }
        FollowUpVerdict::NoSignal
    }
}

/// Multi-word cues match as substrings, single words as whole words.
fn find_cue(lower: &str, words: &[&str], cues: &[&'static str]) -> Option<&'static str> {
    cues.iter().copied().find(|cue| {
        if cue.contains(' ') {
            lower.contains(cue)
        } else {
            words.contains(cue)
        }
    })
}

//! Escalation router configuration.

use serde::{Deserialize, Serialize};

const fn default_error_window() -> u32 {
    3
}

const fn default_error_threshold() -> u32 {
    2
}

const fn default_max_react_iterations() -> u32 {
    10
}

const fn default_max_replans() -> u32 {
    3
}

const fn default_short_reply_words() -> usize {
    4
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouterConfig {
    /// Number of most recent tool attempts inspected for repeated errors.
    #[serde(default = "default_error_window")]
    pub error_window: u32,

    /// Errors within the window that force escalation.
    #[serde(default = "default_error_threshold")]
    pub error_threshold: u32,

    /// ReAct loop iterations allowed before escalating.
    #[serde(default = "default_max_react_iterations")]
    pub max_react_iterations: u32,

    /// Reflector revisions allowed before the pipeline gives up.
    #[serde(default = "default_max_replans")]
    pub max_replans: u32,

    /// Follow-ups with at most this many words and no keyword hit are
    /// handed to the classifier.
    #[serde(default = "default_short_reply_words")]
    pub short_reply_words: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            error_window: default_error_window(),
            error_threshold: default_error_threshold(),
            max_react_iterations: default_max_react_iterations(),
            max_replans: default_max_replans(),
            short_reply_words: default_short_reply_words(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = RouterConfig::default();
        assert_eq!(config.error_window, 3);
        assert_eq!(config.error_threshold, 2);
        assert_eq!(config.max_react_iterations, 10);
        assert_eq!(config.max_replans, 3);
        assert_eq!(config.short_reply_words, 4);
    }
}

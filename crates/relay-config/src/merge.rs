//! Message merge and thought aggregation configuration.

use serde::{Deserialize, Serialize};

/// Default number of recent messages scanned for unlinked thoughts.
const fn default_recovery_window() -> usize {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MergeConfig {
    /// How many of the most recent messages the thought aggregator scans for
    /// thoughts from messages not yet linked into a research block.
    #[serde(default = "default_recovery_window")]
    pub recovery_window: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            recovery_window: default_recovery_window(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        assert_eq!(MergeConfig::default().recovery_window, 30);
    }
}

//! Event stream decoding configuration.

use serde::{Deserialize, Serialize};

/// Default SSE buffer bound (1 MiB).
const fn default_max_buffer_bytes() -> usize {
    1024 * 1024
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamConfig {
    /// Upper bound on buffered, not-yet-framed SSE text. A stream that never
    /// terminates a frame cannot grow the buffer past this.
    #[serde(default = "default_max_buffer_bytes")]
    pub max_buffer_bytes: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            max_buffer_bytes: default_max_buffer_bytes(),
        }
    }
}

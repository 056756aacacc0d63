//! Terminal facts detected once at startup and read by the table renderer.

use std::io::IsTerminal;
use std::sync::OnceLock;

use crate::cli::{GlobalFlags, OutputFormat};

const NARROWEST_USABLE: usize = 40;

#[derive(Clone, Copy, Debug, Default)]
pub struct Terminal {
    /// ANSI row highlighting in table output.
    pub color: bool,
    /// Columns available, when `COLUMNS` says so.
    pub width: Option<usize>,
}

static TERMINAL: OnceLock<Terminal> = OnceLock::new();

pub fn init(flags: &GlobalFlags) {
    let color = flags.format == OutputFormat::Table
        && !flags.quiet
        && std::env::var_os("NO_COLOR").is_none()
        && std::io::stdout().is_terminal();
    let width = std::env::var("COLUMNS")
        .ok()
        .and_then(|columns| columns.trim().parse::<usize>().ok())
        .filter(|columns| *columns >= NARROWEST_USABLE);

    if TERMINAL.set(Terminal { color, width }).is_err() {
        tracing::debug!("terminal already detected");
    }
}

/// Detected terminal, or plain output when `init` never ran (tests).
#[must_use]
pub fn terminal() -> Terminal {
    TERMINAL.get().copied().unwrap_or_default()
}

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Replay a recorded SSE transcript through the store.
    Replay(ReplayArgs),
    /// Print the aggregated thoughts of a research block.
    Thoughts(ThoughtsArgs),
    /// Assess a follow-up reply to a fast-path answer.
    Assess(AssessArgs),
    /// Print the effective configuration.
    Config,
}

/// Arguments for `rly replay`.
#[derive(Clone, Debug, Args)]
pub struct ReplayArgs {
    /// Transcript file (`-` reads stdin).
    pub file: PathBuf,
}

/// Arguments for `rly thoughts`.
#[derive(Clone, Debug, Args)]
pub struct ThoughtsArgs {
    /// Transcript file (`-` reads stdin).
    pub file: PathBuf,
    /// Research block id (defaults to the last block).
    #[arg(long)]
    pub research: Option<String>,
}

/// Arguments for `rly assess`.
#[derive(Clone, Debug, Args)]
pub struct AssessArgs {
    /// The user's reply.
    pub text: String,
    /// The fast-path answer being replied to.
    #[arg(long, default_value = "")]
    pub answer: String,
}

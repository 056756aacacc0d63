use anyhow::Context;
use relay_config::RelayConfig;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;

/// Load the configuration once and hand the parsed command to its handler.
pub async fn dispatch(command: Commands, flags: &GlobalFlags) -> anyhow::Result<()> {
    let config = RelayConfig::load_with_dotenv().context("failed to load configuration")?;

    match command {
        Commands::Replay(args) => commands::replay::handle(&args, &config, flags).await,
        Commands::Thoughts(args) => commands::thoughts::handle(&args, &config, flags).await,
        Commands::Assess(args) => commands::assess::handle(&args, &config, flags),
        Commands::Config => commands::config::handle(&config, flags),
    }
}

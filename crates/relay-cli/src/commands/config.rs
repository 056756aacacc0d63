use relay_config::RelayConfig;

use crate::cli::GlobalFlags;
use crate::output::output;

/// Print the configuration after every layer has been applied and validated.
pub fn handle(config: &RelayConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(config, flags.format)
}

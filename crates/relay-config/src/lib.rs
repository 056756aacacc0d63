//! # relay-config
//!
//! Layered configuration loading for Relay using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`RELAY_*` prefix, `__` as separator)
//! 2. Project-level `.relay/config.toml`
//! 3. User-level `~/.config/relay/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `RELAY_ROUTER__MAX_REPLANS` -> `router.max_replans`,
//! `RELAY_MERGE__RECOVERY_WINDOW` -> `merge.recovery_window`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use relay_config::RelayConfig;
//!
//! let config = RelayConfig::load_with_dotenv().expect("config");
//! println!("replan budget: {}", config.router.max_replans);
//! ```

mod error;
mod merge;
mod router;
mod stream;

pub use error::ConfigError;
pub use merge::MergeConfig;
pub use router::RouterConfig;
pub use stream::StreamConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub merge: MergeConfig,
    #[serde(default)]
    pub router: RouterConfig,
}

impl RelayConfig {
    /// Load configuration from all sources (TOML files + environment variables)
    /// and validate it.
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` when a source cannot be parsed and
    /// `ConfigError::InvalidValue` when a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".relay/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("RELAY_").split("__"))
    }

    /// Reject values that would make the router or aggregator degenerate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let router = &self.router;
        if router.error_window == 0 {
            return Err(ConfigError::invalid("router.error_window", "must be at least 1"));
        }
        if router.error_threshold == 0 {
            return Err(ConfigError::invalid(
                "router.error_threshold",
                "must be at least 1",
            ));
        }
        if router.error_threshold > router.error_window {
            return Err(ConfigError::invalid(
                "router.error_threshold",
                format!(
                    "{} errors can never fit in a window of {} attempts",
                    router.error_threshold, router.error_window
                ),
            ));
        }
        if router.max_react_iterations == 0 {
            return Err(ConfigError::invalid(
                "router.max_react_iterations",
                "must be at least 1",
            ));
        }
        if self.merge.recovery_window == 0 {
            return Err(ConfigError::invalid(
                "merge.recovery_window",
                "must be at least 1",
            ));
        }
        if self.stream.max_buffer_bytes < 1024 {
            return Err(ConfigError::invalid(
                "stream.max_buffer_bytes",
                "must be at least 1024",
            ));
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("relay").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = RelayConfig::default();
        config.validate().expect("defaults should validate");
        assert_eq!(config.merge.recovery_window, 30);
        assert_eq!(config.router.max_replans, 3);
    }

    #[test]
    fn figment_builds_without_files() {
        let config: RelayConfig = RelayConfig::figment()
            .extract()
            .expect("should extract defaults");
        assert_eq!(config.router.error_window, 3);
        assert_eq!(config.stream.max_buffer_bytes, 1024 * 1024);
    }

    #[test]
    fn threshold_larger_than_window_is_rejected() {
        let mut config = RelayConfig::default();
        config.router.error_threshold = 4;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "router.error_threshold"
        ));
    }

    #[test]
    fn zero_recovery_window_is_rejected() {
        let mut config = RelayConfig::default();
        config.merge.recovery_window = 0;
        assert!(config.validate().is_err());
    }
}

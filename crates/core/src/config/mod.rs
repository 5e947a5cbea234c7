//! Configuration module for the locator
//!
//! Configuration can be loaded from TOML files and/or environment variables.
//! Every field has a default, so an absent file yields a usable config.

mod defaults;
mod loading;


use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use defaults::*;

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.uilocator/config.toml`.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".uilocator").join("config.toml"))
}

/// Search engine tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorConfig {
    /// Sleep between polling passes, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Timeout used when the caller does not give one
    #[serde(default = "default_timeout_secs")]
    pub default_timeout_secs: u64,

    /// Timeout for the implicit root lookup of a descendant search
    #[serde(default = "default_root_refresh_timeout_secs")]
    pub root_refresh_timeout_secs: u64,

    /// Lowercase prefixes that make a descendant path's first level mean
    /// "the top-level window"
    #[serde(default = "default_top_level_sentinels")]
    pub top_level_sentinels: Vec<String>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            default_timeout_secs: default_timeout_secs(),
            root_refresh_timeout_secs: default_root_refresh_timeout_secs(),
            top_level_sentinels: default_top_level_sentinels(),
        }
    }
}

impl LocatorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// True if `level` starts with one of the top-level sentinels
    pub fn is_top_level_sentinel(&self, level: &str) -> bool {
        let lowered = level.trim().to_lowercase();
        self.top_level_sentinels
            .iter()
            .any(|sentinel| lowered.starts_with(&sentinel.to_lowercase()))
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Search engine configuration
    #[serde(default)]
    pub locator: LocatorConfig,
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.locator.poll_interval_ms == 0 {
            return Err(Error::config(
                "locator.poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        if self.locator.root_refresh_timeout_secs == 0 {
            return Err(Error::config(
                "locator.root_refresh_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if let Some(blank) = self
            .locator
            .top_level_sentinels
            .iter()
            .position(|s| s.trim().is_empty())
        {
            return Err(Error::config(format!(
                "locator.top_level_sentinels[{blank}] must not be blank"
            )));
        }

        Ok(())
    }

    /// Saves the configuration to a TOML file
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, toml_string)
            .map_err(|e| Error::config(format!("Failed to write config file: {e}")))?;

        Ok(())
    }
}

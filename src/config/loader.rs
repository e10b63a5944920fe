use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::RuntimeConfig;

/// Upper bound for `test_store.receive_timeout_ms`.
const MAX_RECEIVE_TIMEOUT_MS: u64 = 60_000;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl RuntimeConfig {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/statecraft/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("statecraft").join("config.toml")
    }

    /// Loads configuration from the default config file.
    ///
    /// - If the file doesn't exist, returns `RuntimeConfig::default()`.
    /// - If the file exists, parses it as TOML and validates.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(RuntimeConfig::default());
        }

        Self::load_from(&path)
    }

    /// Loads configuration from an explicit path. A missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: RuntimeConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks that the receive timeout is positive and at most one minute.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timeout = self.test_store.receive_timeout_ms;
        if timeout == 0 {
            return Err(ConfigError::ValidationError {
                message: "test_store.receive_timeout_ms must be greater than zero".to_string(),
            });
        }

        if timeout > MAX_RECEIVE_TIMEOUT_MS {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "test_store.receive_timeout_ms is {}, maximum is {}",
                    timeout, MAX_RECEIVE_TIMEOUT_MS
                ),
            });
        }

        Ok(())
    }
}

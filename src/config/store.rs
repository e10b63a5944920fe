//! Thread-safe configuration storage.
//!
//! Provides an in-memory config container with interior mutability that can
//! be reloaded from the file it was created from.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::loader::ConfigError;
use crate::config::types::RuntimeConfig;

/// Thread-safe config container with interior mutability.
#[derive(Clone)]
pub struct ConfigStore {
    inner: Arc<RwLock<RuntimeConfig>>,
    path: PathBuf,
}

impl ConfigStore {
    /// Create a new ConfigStore from initial config and path.
    pub fn new(config: RuntimeConfig, path: PathBuf) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
            path,
        }
    }

    /// Load from `path` and wrap the result.
    pub fn open(path: PathBuf) -> Result<Self, ConfigError> {
        let config = RuntimeConfig::load_from(&path)?;
        Ok(Self::new(config, path))
    }

    /// Get a clone of the current config.
    pub fn get(&self) -> RuntimeConfig {
        self.inner.read().clone()
    }

    /// Reload config from the file.
    ///
    /// On success, atomically replaces the current config and installs it as
    /// the process-wide runtime config. On failure, keeps the old config and
    /// returns the error.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let config = RuntimeConfig::load_from(&self.path)?;
        *self.inner.write() = config.clone();
        config.apply();
        Ok(())
    }

    /// Get the config file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

use serde::{Deserialize, Serialize};

use crate::misuse::MisusePolicy;

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub test_store: TestStoreConfig,
}

/// Settings for live stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Emit a `debug` trace for every processed action (default: true).
    #[serde(default = "default_log_actions")]
    pub log_actions: bool,
    /// How programmer misuse is reported. Unset means panic in debug builds
    /// and log in release builds.
    #[serde(default)]
    pub misuse: Option<MisusePolicy>,
}

/// Defaults for every `TestStore` created afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestStoreConfig {
    /// How long `receive` waits for an effect action (default: 1000).
    #[serde(default = "default_receive_timeout_ms")]
    pub receive_timeout_ms: u64,
    #[serde(default)]
    pub exhaustivity: ExhaustivityMode,
    /// Log state changes and actions skipped in non-exhaustive mode (default: true).
    #[serde(default = "default_show_skipped_assertions")]
    pub show_skipped_assertions: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustivityMode {
    #[default]
    On,
    Off,
}

fn default_log_actions() -> bool {
    true
}

fn default_receive_timeout_ms() -> u64 {
    1000
}

fn default_show_skipped_assertions() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            log_actions: default_log_actions(),
            misuse: None,
        }
    }
}

impl Default for TestStoreConfig {
    fn default() -> Self {
        Self {
            receive_timeout_ms: default_receive_timeout_ms(),
            exhaustivity: ExhaustivityMode::default(),
            show_skipped_assertions: default_show_skipped_assertions(),
        }
    }
}

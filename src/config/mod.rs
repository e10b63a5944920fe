//! Runtime configuration.
//!
//! The active [`RuntimeConfig`] is process-wide: stores read `store.*` when
//! they are built and test stores read `test_store.*` when they are created.

pub mod loader;
pub mod store;
pub mod types;

use parking_lot::RwLock;

use crate::misuse;

pub use loader::ConfigError;
pub use store::ConfigStore;
pub use types::{ExhaustivityMode, RuntimeConfig, StoreConfig, TestStoreConfig};

static INSTALLED: RwLock<Option<RuntimeConfig>> = parking_lot::const_rwlock(None);

impl RuntimeConfig {
    /// The installed config, or the defaults if none was applied.
    pub fn current() -> RuntimeConfig {
        INSTALLED.read().clone().unwrap_or_default()
    }

    /// Install as the process-wide config and apply the misuse policy.
    ///
    /// A config without `store.misuse` restores the build default.
    pub fn apply(self) {
        match self.store.misuse {
            Some(policy) => misuse::set_policy(policy),
            None => misuse::reset_policy(),
        }
        *INSTALLED.write() = Some(self);
    }
}

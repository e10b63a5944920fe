use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::DependencyKey;

/// Source of the current date.
#[derive(Clone)]
pub struct DateGenerator {
    now: Arc<dyn Fn() -> SystemTime + Send + Sync>,
}

impl DateGenerator {
    pub fn new(now: impl Fn() -> SystemTime + Send + Sync + 'static) -> Self {
        Self { now: Arc::new(now) }
    }

    pub fn system() -> Self {
        Self::new(SystemTime::now)
    }

    pub fn constant(date: SystemTime) -> Self {
        Self::new(move || date)
    }

    /// Constant date `seconds` after the Unix epoch.
    pub fn since_epoch(seconds: u64) -> Self {
        Self::constant(UNIX_EPOCH + Duration::from_secs(seconds))
    }

    pub fn now(&self) -> SystemTime {
        (self.now)()
    }
}

impl fmt::Debug for DateGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DateGenerator")
    }
}

pub struct DateKey;

impl DependencyKey for DateKey {
    type Value = DateGenerator;

    fn test_value() -> Self::Value {
        DateGenerator::constant(UNIX_EPOCH)
    }

    fn live_value() -> Option<Self::Value> {
        Some(DateGenerator::system())
    }
}

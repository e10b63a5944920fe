use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use super::DependencyKey;

/// Generator of unique ids.
#[derive(Clone)]
pub struct UuidGenerator {
    generate: Arc<dyn Fn() -> Uuid + Send + Sync>,
}

impl UuidGenerator {
    pub fn new(generate: impl Fn() -> Uuid + Send + Sync + 'static) -> Self {
        Self {
            generate: Arc::new(generate),
        }
    }

    pub fn random() -> Self {
        Self::new(Uuid::new_v4)
    }

    /// 00000000-0000-0000-0000-000000000000, then ...0001, and so on.
    pub fn incrementing() -> Self {
        let next = AtomicU64::new(0);
        Self::new(move || Uuid::from_u128(u128::from(next.fetch_add(1, Ordering::SeqCst))))
    }

    pub fn constant(uuid: Uuid) -> Self {
        Self::new(move || uuid)
    }

    pub fn generate(&self) -> Uuid {
        (self.generate)()
    }
}

impl fmt::Debug for UuidGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UuidGenerator")
    }
}

pub struct UuidKey;

impl DependencyKey for UuidKey {
    type Value = UuidGenerator;

    fn test_value() -> Self::Value {
        UuidGenerator::incrementing()
    }

    fn live_value() -> Option<Self::Value> {
        Some(UuidGenerator::random())
    }
}

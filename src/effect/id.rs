use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::identity::StateId;

/// Values usable as cancellation keys.
pub trait CancelKey: Hash + Eq + fmt::Debug + Send + Sync + 'static {}

impl<K: Hash + Eq + fmt::Debug + Send + Sync + 'static> CancelKey for K {}

trait ErasedKey: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn eq_key(&self, other: &dyn ErasedKey) -> bool;
    fn hash_key(&self, state: &mut dyn Hasher);
    fn fmt_key(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<K: CancelKey> ErasedKey for K {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_key(&self, other: &dyn ErasedKey) -> bool {
        other
            .as_any()
            .downcast_ref::<K>()
            .is_some_and(|other| self == other)
    }

    fn hash_key(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<K>().hash(&mut state);
        self.hash(&mut state);
    }

    fn fmt_key(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Navigation(StateId);

/// Cancellation identifier.
///
/// A user key plus the chain of navigation identities it was scoped under,
/// outermost first. The same key used by two different presented children
/// yields two distinct ids.
#[derive(Clone)]
pub struct CancelId {
    key: Arc<dyn ErasedKey>,
    scope: Vec<StateId>,
}

impl CancelId {
    pub fn new<K: CancelKey>(key: K) -> Self {
        Self {
            key: Arc::new(key),
            scope: Vec::new(),
        }
    }

    /// Id under which every effect of a presented child is registered.
    pub(crate) fn navigation(id: StateId) -> Self {
        Self::new(Navigation(id))
    }

    pub(crate) fn within(mut self, navigation: StateId) -> Self {
        self.scope.insert(0, navigation);
        self
    }

    pub fn scope(&self) -> &[StateId] {
        &self.scope
    }
}

impl PartialEq for CancelId {
    fn eq(&self, other: &Self) -> bool {
        self.scope == other.scope && self.key.eq_key(other.key.as_ref())
    }
}

impl Eq for CancelId {}

impl Hash for CancelId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.scope.hash(state);
        self.key.hash_key(state);
    }
}

impl fmt::Debug for CancelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.key.fmt_key(f)?;
        for navigation in &self.scope {
            write!(f, " in {navigation:?}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Debug, Hash, PartialEq, Eq)]
    enum Cancel {
        Timer,
        Request,
    }

    #[derive(Debug, Hash, PartialEq, Eq)]
    struct Timer;

    #[test]
    fn same_key_same_id() {
        assert_eq!(CancelId::new(Cancel::Timer), CancelId::new(Cancel::Timer));
        assert_ne!(CancelId::new(Cancel::Timer), CancelId::new(Cancel::Request));
    }

    #[test]
    fn different_types_never_collide() {
        assert_ne!(CancelId::new(Cancel::Timer), CancelId::new(Timer));
        assert_ne!(CancelId::new(0u8), CancelId::new(0u16));
    }

    #[test]
    fn scope_distinguishes_ids() {
        let first = StateId::new();
        let second = StateId::new();
        let a = CancelId::new(Timer).within(first);
        let b = CancelId::new(Timer).within(second);
        assert_ne!(a, b);
        assert_eq!(a, CancelId::new(Timer).within(first));
    }

    #[test]
    fn usable_as_hash_key() {
        let nav = StateId::new();
        let mut set = HashSet::new();
        set.insert(CancelId::new(Timer));
        set.insert(CancelId::new(Timer).within(nav));
        set.insert(CancelId::new(Timer));
        assert_eq!(set.len(), 2);
        assert!(set.contains(&CancelId::new(Timer).within(nav)));
    }

    #[test]
    fn debug_lists_scope() {
        let id = CancelId::new(Timer);
        assert_eq!(format!("{id:?}"), "Timer");
    }
}

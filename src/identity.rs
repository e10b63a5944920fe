//! Identity tokens for observable state.
//!
//! Identity is tracked separately from value equality: two states with equal
//! content can still be different logical entities, and a state keeps its
//! identity across in-place mutation and `Clone`.

use std::fmt;

use uuid::Uuid;

/// Comparable, copyable identity token attached to a state value.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateId {
    uuid: Uuid,
    tag: Option<u32>,
}

impl StateId {
    /// Create a fresh, unique identity.
    pub fn new() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            tag: None,
        }
    }

    /// Derive an identity that differs per enum case while sharing the base token.
    pub fn tagged(self, tag: u32) -> Self {
        Self {
            tag: Some(tag),
            ..self
        }
    }

    pub fn tag(&self) -> Option<u32> {
        self.tag
    }
}

impl Default for StateId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let simple = self.uuid.simple().to_string();
        match self.tag {
            Some(tag) => write!(f, "StateId({}#{})", &simple[..8], tag),
            None => write!(f, "StateId({})", &simple[..8]),
        }
    }
}

/// Identity field for feature state structs.
///
/// Always compares equal and prints as `_`, so deriving `PartialEq` and `Debug`
/// on a state struct compares and renders only its content.
#[derive(Clone, Copy, Default)]
pub struct Identity(StateId);

impl Identity {
    pub fn new() -> Self {
        Self(StateId::new())
    }

    pub fn id(&self) -> StateId {
        self.0
    }
}

impl PartialEq for Identity {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for Identity {}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("_")
    }
}

/// State that carries an identity token.
pub trait ObservableState {
    fn state_id(&self) -> StateId;
}

/// "Did this subtree's identity change" query for rendering layers.
///
/// Returns true iff every identity token is pairwise equal in the same order
/// (collections), or both sides are absent or present with equal tokens
/// (optionals).
pub trait IdentityEq {
    fn is_identity_equal(&self, other: &Self) -> bool;
}

impl<T: ObservableState> IdentityEq for Option<T> {
    fn is_identity_equal(&self, other: &Self) -> bool {
        match (self, other) {
            (None, None) => true,
            (Some(lhs), Some(rhs)) => lhs.state_id() == rhs.state_id(),
            _ => false,
        }
    }
}

impl<T: ObservableState> IdentityEq for Vec<T> {
    fn is_identity_equal(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(lhs, rhs)| lhs.state_id() == rhs.state_id())
    }
}

/// Identity comparison for two single observable values.
pub fn same_identity<T: ObservableState>(lhs: &T, rhs: &T) -> bool {
    lhs.state_id() == rhs.state_id()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Counter {
        identity: Identity,
        count: i32,
    }

    impl ObservableState for Counter {
        fn state_id(&self) -> StateId {
            self.identity.id()
        }
    }

    fn counter(count: i32) -> Counter {
        Counter {
            identity: Identity::new(),
            count,
        }
    }

    #[test]
    fn fresh_ids_are_unique() {
        assert_ne!(StateId::new(), StateId::new());
    }

    #[test]
    fn tag_distinguishes_cases() {
        let base = StateId::new();
        assert_ne!(base.tagged(0), base.tagged(1));
        assert_eq!(base.tagged(2), base.tagged(2));
        assert_eq!(base.tagged(2).tag(), Some(2));
    }

    #[test]
    fn clone_and_mutation_preserve_identity() {
        let original = counter(1);
        let mut copy = original.clone();
        copy.count += 10;
        assert!(same_identity(&original, &copy));
    }

    #[test]
    fn equal_content_different_identity() {
        let lhs = counter(3);
        let rhs = counter(3);
        assert_eq!(lhs, rhs);
        assert!(!same_identity(&lhs, &rhs));
    }

    #[test]
    fn optional_identity_equality() {
        let value = counter(0);
        assert!(None::<Counter>.is_identity_equal(&None));
        assert!(Some(value.clone()).is_identity_equal(&Some(value.clone())));
        assert!(!Some(value.clone()).is_identity_equal(&None));
        assert!(!Some(value).is_identity_equal(&Some(counter(0))));
    }

    #[test]
    fn vec_identity_is_order_sensitive() {
        let a = counter(0);
        let b = counter(1);
        let forward = vec![a.clone(), b.clone()];
        assert!(forward.is_identity_equal(&vec![a.clone(), b.clone()]));
        assert!(!forward.is_identity_equal(&vec![b, a]));
    }

    #[test]
    fn identity_debug_is_hidden() {
        assert_eq!(format!("{:?}", Identity::new()), "_");
    }
}

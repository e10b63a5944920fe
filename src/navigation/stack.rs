use std::fmt;

use thiserror::Error;

use crate::identity::{IdentityEq, StateId};
use crate::misuse;

/// Id of a stack element, unique within its stack.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StackElementId(u64);

impl StackElementId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for StackElementId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Debug for StackElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why an explicit push was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StackPushError {
    #[error("stack element id {id:?} was already used by this stack (next free id is #{next})")]
    Reused { id: StackElementId, next: u64 },
    #[error("stack element ids are exhausted")]
    Exhausted,
}

#[derive(Clone)]
struct Entry<E> {
    id: StackElementId,
    identity: StateId,
    element: E,
}

/// Ordered stack of child states keyed by [`StackElementId`].
///
/// Ids come from a monotonic counter and are never reused by the same stack.
#[derive(Clone)]
pub struct StackState<E> {
    entries: Vec<Entry<E>>,
    next_id: u64,
}

impl<E> StackState<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Push `element` under the next generated id.
    ///
    /// Once the id space is used up the element is dropped and the failure is
    /// reported as misuse.
    pub fn push(&mut self, element: E) -> StackElementId {
        let id = StackElementId(self.next_id);
        if let Err(error) = self.push_with_id(id, element) {
            misuse::report(error);
        }
        id
    }

    /// Push under an explicit id.
    ///
    /// The id must not have been handed out by this stack before, even if the
    /// element that carried it was popped since. `u64::MAX` is never issued.
    pub fn push_with_id(&mut self, id: StackElementId, element: E) -> Result<(), StackPushError> {
        if id.0 < self.next_id {
            return Err(StackPushError::Reused {
                id,
                next: self.next_id,
            });
        }
        self.next_id = id.0.checked_add(1).ok_or(StackPushError::Exhausted)?;
        self.entries.push(Entry {
            id,
            identity: StateId::new(),
            element,
        });
        Ok(())
    }

    /// The id the next [`push`](Self::push) will use.
    pub fn next_id(&self) -> StackElementId {
        StackElementId(self.next_id)
    }

    pub fn pop(&mut self) -> Option<E> {
        self.entries.pop().map(|e| e.element)
    }

    /// Remove the element `id` and everything above it.
    pub fn pop_from(&mut self, id: StackElementId) -> Vec<E> {
        match self.position(id) {
            Some(index) => self.entries.drain(index..).map(|e| e.element).collect(),
            None => Vec::new(),
        }
    }

    /// Remove everything above `id`, keeping `id` itself.
    pub fn pop_to(&mut self, id: StackElementId) -> Vec<E> {
        match self.position(id) {
            Some(index) => self.entries.drain(index + 1..).map(|e| e.element).collect(),
            None => Vec::new(),
        }
    }

    pub fn remove(&mut self, id: StackElementId) -> Option<E> {
        let index = self.position(id)?;
        Some(self.entries.remove(index).element)
    }

    pub fn get(&self, id: StackElementId) -> Option<&E> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.element)
    }

    pub fn get_mut(&mut self, id: StackElementId) -> Option<&mut E> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| &mut e.element)
    }

    pub fn contains(&self, id: StackElementId) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: StackElementId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn ids(&self) -> Vec<StackElementId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StackElementId, &E)> {
        self.entries.iter().map(|e| (e.id, &e.element))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (StackElementId, &mut E)> {
        self.entries.iter_mut().map(|e| (e.id, &mut e.element))
    }

    pub fn first(&self) -> Option<&E> {
        self.entries.first().map(|e| &e.element)
    }

    pub fn last(&self) -> Option<&E> {
        self.entries.last().map(|e| &e.element)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (element id, navigation identity) for every element, bottom to top.
    pub(crate) fn identities(&self) -> Vec<(StackElementId, StateId)> {
        self.entries.iter().map(|e| (e.id, e.identity)).collect()
    }

    pub(crate) fn entry(&self, id: StackElementId) -> Option<(StateId, &E)> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| (e.identity, &e.element))
    }

    pub(crate) fn entry_mut(&mut self, id: StackElementId) -> Option<(StateId, &mut E)> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| (e.identity, &mut e.element))
    }
}

impl<E> Default for StackState<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> FromIterator<E> for StackState<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let mut stack = Self::new();
        for element in iter {
            stack.push(element);
        }
        stack
    }
}

impl<E: PartialEq> PartialEq for StackState<E> {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(other.entries.iter())
                .all(|(lhs, rhs)| lhs.id == rhs.id && lhs.element == rhs.element)
    }
}

impl<E: fmt::Debug> fmt::Debug for StackState<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|e| (e.id, &e.element)))
            .finish()
    }
}

impl<E> IdentityEq for StackState<E> {
    fn is_identity_equal(&self, other: &Self) -> bool {
        self.identities() == other.identities()
    }
}

/// Action addressed to a navigation stack.
#[derive(Debug, Clone, PartialEq)]
pub enum StackAction<S, A> {
    Element { id: StackElementId, action: A },
    PopFrom { id: StackElementId },
    Push { id: StackElementId, state: S },
}

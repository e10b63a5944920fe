use std::fmt;

use crate::identity::{IdentityEq, StateId};

/// Optional child state that may be presented and dismissed.
///
/// Every call to [`present`](Self::present) mints a fresh identity, so
/// replacing a child with an equal value still counts as a new presentation.
#[derive(Clone)]
pub struct PresentationState<C> {
    presented: Option<Presented<C>>,
}

#[derive(Clone)]
struct Presented<C> {
    id: StateId,
    value: C,
}

impl<C> PresentationState<C> {
    pub fn none() -> Self {
        Self { presented: None }
    }

    pub fn presenting(value: C) -> Self {
        let mut state = Self::none();
        state.present(value);
        state
    }

    pub fn present(&mut self, value: C) {
        self.presented = Some(Presented {
            id: StateId::new(),
            value,
        });
    }

    /// Clear the slot, returning the child that was presented.
    pub fn dismiss(&mut self) -> Option<C> {
        self.presented.take().map(|p| p.value)
    }

    pub fn set(&mut self, value: Option<C>) {
        match value {
            Some(value) => self.present(value),
            None => {
                self.dismiss();
            }
        }
    }

    pub fn is_presented(&self) -> bool {
        self.presented.is_some()
    }

    pub fn as_ref(&self) -> Option<&C> {
        self.presented.as_ref().map(|p| &p.value)
    }

    pub fn as_mut(&mut self) -> Option<&mut C> {
        self.presented.as_mut().map(|p| &mut p.value)
    }

    /// Identity of the current presentation.
    pub fn id(&self) -> Option<StateId> {
        self.presented.as_ref().map(|p| p.id)
    }

    pub(crate) fn entry_mut(&mut self) -> Option<(StateId, &mut C)> {
        self.presented.as_mut().map(|p| (p.id, &mut p.value))
    }
}

impl<C> Default for PresentationState<C> {
    fn default() -> Self {
        Self::none()
    }
}

impl<C> From<Option<C>> for PresentationState<C> {
    fn from(value: Option<C>) -> Self {
        let mut state = Self::none();
        state.set(value);
        state
    }
}

impl<C: PartialEq> PartialEq for PresentationState<C> {
    fn eq(&self, other: &Self) -> bool {
        self.as_ref() == other.as_ref()
    }
}

impl<C: fmt::Debug> fmt::Debug for PresentationState<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.as_ref(), f)
    }
}

impl<C> IdentityEq for PresentationState<C> {
    fn is_identity_equal(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

/// Action addressed to a presented child.
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationAction<A> {
    Dismiss,
    Presented(A),
}

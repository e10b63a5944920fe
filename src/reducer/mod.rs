//! Reducers and their composition operators.
//!
//! # Architecture
//!
//! ```text
//! (State, Action) ──→ Reducer ──→ (State', Effect<Action>)
//! ```
//!
//! - **State**: owned by the store, mutated in place
//! - **Action**: user events and effect feedback
//! - **Reducer**: synchronous state transition, returns the work to run next

mod action;
mod presentation;
mod scope;
mod stack;
mod state;

use std::marker::PhantomData;

use crate::effect::Effect;
use crate::identity::ObservableState;
use crate::navigation::{PresentationAction, PresentationState, StackAction, StackState};

pub use action::Action;
pub use presentation::IfLet;
pub use scope::{IfSome, Scope};
pub use stack::ForEach;
pub use state::State;

/// The only place where state transitions happen.
pub trait Reducer: Send + Sync + 'static {
    type State: State;
    type Action: Action;

    /// Mutate `state` in response to `action` and describe follow-up work.
    fn reduce(&self, state: &mut Self::State, action: &Self::Action) -> Effect<Self::Action>;
}

impl<R: Reducer + ?Sized> Reducer for Box<R> {
    type State = R::State;
    type Action = R::Action;

    fn reduce(&self, state: &mut Self::State, action: &Self::Action) -> Effect<Self::Action> {
        (**self).reduce(state, action)
    }
}

impl<R: Reducer + ?Sized> Reducer for std::sync::Arc<R> {
    type State = R::State;
    type Action = R::Action;

    fn reduce(&self, state: &mut Self::State, action: &Self::Action) -> Effect<Self::Action> {
        (**self).reduce(state, action)
    }
}

/// Reducer built from a closure.
pub struct Reduce<S, A, F> {
    reduce: F,
    _marker: PhantomData<fn(&mut S, &A)>,
}

impl<S, A, F> Reduce<S, A, F>
where
    F: Fn(&mut S, &A) -> Effect<A>,
{
    pub fn new(reduce: F) -> Self {
        Self {
            reduce,
            _marker: PhantomData,
        }
    }
}

impl<S: State, A: Action, F> Reducer for Reduce<S, A, F>
where
    F: Fn(&mut S, &A) -> Effect<A> + Send + Sync + 'static,
{
    type State = S;
    type Action = A;

    fn reduce(&self, state: &mut S, action: &A) -> Effect<A> {
        (self.reduce)(state, action)
    }
}

/// Run two reducers in order on the same state, merging their effects.
pub struct Combine<L, R> {
    first: L,
    second: R,
}

impl<L, R> Reducer for Combine<L, R>
where
    L: Reducer,
    R: Reducer<State = L::State, Action = L::Action>,
{
    type State = L::State;
    type Action = L::Action;

    fn reduce(&self, state: &mut Self::State, action: &Self::Action) -> Effect<Self::Action> {
        let first = self.first.reduce(state, action);
        let second = self.second.reduce(state, action);
        Effect::merge([first, second])
    }
}

/// Run a reaction whenever a selected part of state changes.
pub struct OnChange<R: Reducer, V> {
    base: R,
    select: fn(&R::State) -> V,
    react: fn(&V, &mut R::State) -> Effect<R::Action>,
}

impl<R, V> Reducer for OnChange<R, V>
where
    R: Reducer,
    V: PartialEq + Send + Sync + 'static,
{
    type State = R::State;
    type Action = R::Action;

    fn reduce(&self, state: &mut Self::State, action: &Self::Action) -> Effect<Self::Action> {
        let old = (self.select)(state);
        let effect = self.base.reduce(state, action);
        if (self.select)(state) == old {
            return effect;
        }
        let reaction = (self.react)(&old, state);
        Effect::merge([effect, reaction])
    }
}

/// Composition operators available on every reducer.
pub trait ReducerExt: Reducer + Sized {
    fn combine<R>(self, other: R) -> Combine<Self, R>
    where
        R: Reducer<State = Self::State, Action = Self::Action>,
    {
        Combine {
            first: self,
            second: other,
        }
    }

    /// Integrate an optional presented child.
    fn if_let<C: Reducer>(
        self,
        to_state: fn(&mut Self::State) -> &mut PresentationState<C::State>,
        to_action: fn(&Self::Action) -> Option<&PresentationAction<C::Action>>,
        from_action: fn(PresentationAction<C::Action>) -> Self::Action,
        child: C,
    ) -> IfLet<Self, C> {
        IfLet::new(self, to_state, to_action, from_action, child)
    }

    /// Integrate a navigation stack of children.
    fn for_each<C>(
        self,
        to_state: fn(&mut Self::State) -> &mut StackState<C::State>,
        to_action: fn(&Self::Action) -> Option<&StackAction<C::State, C::Action>>,
        from_action: fn(StackAction<C::State, C::Action>) -> Self::Action,
        child: C,
    ) -> ForEach<Self, C>
    where
        C: Reducer,
        C::State: Clone,
    {
        ForEach::new(self, to_state, to_action, from_action, child)
    }

    /// Integrate a plain optional child whose identity scopes its effects.
    fn if_some<C>(
        self,
        to_state: fn(&mut Self::State) -> &mut Option<C::State>,
        to_action: fn(&Self::Action) -> Option<&C::Action>,
        from_action: fn(C::Action) -> Self::Action,
        child: C,
    ) -> IfSome<Self, C>
    where
        C: Reducer,
        C::State: ObservableState,
    {
        IfSome::new(self, to_state, to_action, from_action, child)
    }

    fn on_change<V>(
        self,
        select: fn(&Self::State) -> V,
        react: fn(&V, &mut Self::State) -> Effect<Self::Action>,
    ) -> OnChange<Self, V>
    where
        V: PartialEq + Send + Sync + 'static,
    {
        OnChange {
            base: self,
            select,
            react,
        }
    }
}

impl<R: Reducer> ReducerExt for R {}

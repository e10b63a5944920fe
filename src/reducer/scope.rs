use crate::effect::{CancelId, Effect};
use crate::identity::ObservableState;

use super::{Action, Reducer, State};

/// Run a child reducer on a sub-part of parent state.
///
/// `to_state` returns `None` when the parent is in a different enum case; a
/// child action arriving then is ignored.
pub struct Scope<PS, PA, R: Reducer> {
    to_state: fn(&mut PS) -> Option<&mut R::State>,
    to_action: fn(&PA) -> Option<&R::Action>,
    from_action: fn(R::Action) -> PA,
    child: R,
}

impl<PS, PA, R: Reducer> Scope<PS, PA, R> {
    pub fn new(
        to_state: fn(&mut PS) -> Option<&mut R::State>,
        to_action: fn(&PA) -> Option<&R::Action>,
        from_action: fn(R::Action) -> PA,
        child: R,
    ) -> Self {
        Self {
            to_state,
            to_action,
            from_action,
            child,
        }
    }
}

impl<PS: State, PA: Action, R: Reducer> Reducer for Scope<PS, PA, R> {
    type State = PS;
    type Action = PA;

    fn reduce(&self, state: &mut PS, action: &PA) -> Effect<PA> {
        let Some(child_action) = (self.to_action)(action) else {
            return Effect::none();
        };
        let Some(child_state) = (self.to_state)(state) else {
            tracing::trace!(action = ?child_action, "child action for inactive case ignored");
            return Effect::none();
        };
        self.child
            .reduce(child_state, child_action)
            .map(self.from_action)
    }
}

/// Optional child integration keyed by the child's own identity.
///
/// The child runs before the parent. When the child state disappears or is
/// replaced by a different identity, its in-flight effects are cancelled.
pub struct IfSome<P: Reducer, C: Reducer> {
    parent: P,
    to_state: fn(&mut P::State) -> &mut Option<C::State>,
    to_action: fn(&P::Action) -> Option<&C::Action>,
    from_action: fn(C::Action) -> P::Action,
    child: C,
}

impl<P: Reducer, C: Reducer> IfSome<P, C> {
    pub(crate) fn new(
        parent: P,
        to_state: fn(&mut P::State) -> &mut Option<C::State>,
        to_action: fn(&P::Action) -> Option<&C::Action>,
        from_action: fn(C::Action) -> P::Action,
        child: C,
    ) -> Self {
        Self {
            parent,
            to_state,
            to_action,
            from_action,
            child,
        }
    }
}

impl<P, C> Reducer for IfSome<P, C>
where
    P: Reducer,
    C: Reducer,
    C::State: ObservableState,
{
    type State = P::State;
    type Action = P::Action;

    fn reduce(&self, state: &mut P::State, action: &P::Action) -> Effect<P::Action> {
        let before = (self.to_state)(state).as_ref().map(ObservableState::state_id);

        let child_effects = match (self.to_action)(action) {
            Some(child_action) => {
                let Some(child_state) = (self.to_state)(state).as_mut() else {
                    tracing::trace!(action = ?child_action, "action for absent optional child ignored");
                    return Effect::none();
                };
                let navigation = child_state.state_id();
                self.child
                    .reduce(child_state, child_action)
                    .map(self.from_action)
                    .scoped(navigation)
            }
            None => Effect::none(),
        };

        let parent_effects = self.parent.reduce(state, action);

        let after = (self.to_state)(state).as_ref().map(ObservableState::state_id);
        let cancel = match before {
            Some(old) if after != Some(old) => Effect::cancel_id(CancelId::navigation(old)),
            _ => Effect::none(),
        };
        Effect::merge([child_effects, parent_effects, cancel])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Operation;
    use crate::identity::{Identity, StateId};
    use crate::reducer::{Reduce, ReducerExt};

    #[derive(Debug, Clone, PartialEq)]
    enum Mode {
        Editing(String),
        Viewing,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum ModeAction {
        Edit(String),
        Close,
    }

    fn editing(mode: &mut Mode) -> Option<&mut String> {
        match mode {
            Mode::Editing(text) => Some(text),
            Mode::Viewing => None,
        }
    }

    fn edit_action(action: &ModeAction) -> Option<&String> {
        match action {
            ModeAction::Edit(text) => Some(text),
            ModeAction::Close => None,
        }
    }

    fn appender() -> impl Reducer<State = String, Action = String> {
        Reduce::new(|text: &mut String, suffix: &String| {
            text.push_str(suffix);
            Effect::none()
        })
    }

    #[test]
    fn scope_runs_child_in_matching_case() {
        let reducer = Scope::new(editing, edit_action, ModeAction::Edit, appender());
        let mut state = Mode::Editing("ab".into());
        let _ = reducer.reduce(&mut state, &ModeAction::Edit("c".into()));
        assert_eq!(state, Mode::Editing("abc".into()));
    }

    #[test]
    fn scope_ignores_action_for_inactive_case() {
        let reducer = Scope::new(editing, edit_action, ModeAction::Edit, appender());
        let mut state = Mode::Viewing;
        let effect = reducer.reduce(&mut state, &ModeAction::Edit("c".into()));
        assert_eq!(state, Mode::Viewing);
        assert!(effect.is_none());
        assert!(reducer.reduce(&mut state, &ModeAction::Close).is_none());
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Child {
        identity: Identity,
        value: i32,
    }

    impl ObservableState for Child {
        fn state_id(&self) -> StateId {
            self.identity.id()
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum ParentAction {
        Child(i32),
        Clear,
    }

    fn child_slot(state: &mut Option<Child>) -> &mut Option<Child> {
        state
    }

    fn child_action(action: &ParentAction) -> Option<&i32> {
        match action {
            ParentAction::Child(value) => Some(value),
            ParentAction::Clear => None,
        }
    }

    fn optional_reducer() -> impl Reducer<State = Option<Child>, Action = ParentAction> {
        let parent = Reduce::new(|state: &mut Option<Child>, action: &ParentAction| {
            if let ParentAction::Clear = action {
                *state = None;
            }
            Effect::none()
        });
        let child = Reduce::new(|state: &mut Child, delta: &i32| {
            state.value += delta;
            Effect::none()
        });
        parent.if_some(child_slot, child_action, ParentAction::Child, child)
    }

    #[test]
    fn if_some_updates_present_child() {
        let reducer = optional_reducer();
        let mut state = Some(Child {
            identity: Identity::new(),
            value: 1,
        });
        let _ = reducer.reduce(&mut state, &ParentAction::Child(2));
        assert_eq!(state.map(|c| c.value), Some(3));
    }

    #[test]
    fn if_some_absent_child_is_noop() {
        let reducer = optional_reducer();
        let mut state: Option<Child> = None;
        let effect = reducer.reduce(&mut state, &ParentAction::Child(2));
        assert!(state.is_none());
        assert!(effect.is_none());
    }

    #[test]
    fn if_some_cancels_when_child_cleared() {
        let reducer = optional_reducer();
        let child = Child {
            identity: Identity::new(),
            value: 0,
        };
        let id = child.state_id();
        let mut state = Some(child);
        let effect = reducer.reduce(&mut state, &ParentAction::Clear);
        let Operation::Cancel(cancelled) = effect.operation else {
            panic!("expected cancellation");
        };
        assert_eq!(cancelled, CancelId::navigation(id));
    }
}

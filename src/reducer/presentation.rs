use std::sync::Arc;

use crate::effect::{CancelId, Effect};
use crate::navigation::{PresentationAction, PresentationState};

use super::Reducer;

/// Presented-child integration.
///
/// - `Presented(a)` runs the child first, then the parent. Child effects are
///   scoped to the presentation identity.
/// - `Dismiss` runs the parent, then clears the slot.
/// - Whenever the identity in the slot changes (cleared or replaced), every
///   effect started under the old identity is cancelled.
/// - Actions for an empty slot are ignored without running either reducer.
pub struct IfLet<P: Reducer, C: Reducer> {
    parent: P,
    to_state: fn(&mut P::State) -> &mut PresentationState<C::State>,
    to_action: fn(&P::Action) -> Option<&PresentationAction<C::Action>>,
    from_action: fn(PresentationAction<C::Action>) -> P::Action,
    child: C,
}

impl<P: Reducer, C: Reducer> IfLet<P, C> {
    pub(crate) fn new(
        parent: P,
        to_state: fn(&mut P::State) -> &mut PresentationState<C::State>,
        to_action: fn(&P::Action) -> Option<&PresentationAction<C::Action>>,
        from_action: fn(PresentationAction<C::Action>) -> P::Action,
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

impl<P: Reducer, C: Reducer> Reducer for IfLet<P, C> {
    type State = P::State;
    type Action = P::Action;

    fn reduce(&self, state: &mut P::State, action: &P::Action) -> Effect<P::Action> {
        let before = (self.to_state)(state).id();
        let mut child_effects = Effect::none();
        let mut dismiss = false;

        match (self.to_action)(action) {
            Some(PresentationAction::Presented(child_action)) => {
                let Some((navigation, child_state)) = (self.to_state)(state).entry_mut() else {
                    tracing::trace!(action = ?child_action, "action for dismissed presentation ignored");
                    return Effect::none();
                };
                let from = self.from_action;
                child_effects = self
                    .child
                    .reduce(child_state, child_action)
                    .map(move |a| from(PresentationAction::Presented(a)))
                    .resolve_dismiss(Arc::new(move || from(PresentationAction::Dismiss)))
                    .scoped(navigation);
            }
            Some(PresentationAction::Dismiss) => {
                if before.is_none() {
                    tracing::trace!("dismiss for empty presentation ignored");
                    return Effect::none();
                }
                dismiss = true;
            }
            None => {}
        }

        let parent_effects = self.parent.reduce(state, action);
        if dismiss {
            (self.to_state)(state).dismiss();
        }

        let after = (self.to_state)(state).id();
        let cancel = match before {
            Some(old) if after != Some(old) => {
                tracing::debug!(presentation = ?old, "presentation ended, cancelling its effects");
                Effect::cancel_id(CancelId::navigation(old))
            }
            _ => Effect::none(),
        };
        Effect::merge([child_effects, parent_effects, cancel])
    }
}

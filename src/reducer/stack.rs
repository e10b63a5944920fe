use std::sync::Arc;

use crate::effect::{CancelId, Effect};
use crate::misuse;
use crate::navigation::{StackAction, StackState};

use super::Reducer;

/// Stack integration.
///
/// - `Element { id, .. }` runs the child at `id` first, then the parent. A
///   missing id is a no-op for both.
/// - `Push` and `PopFrom` run the parent first, then mutate the stack. A push
///   with an id the stack has already issued is misuse and leaves it unchanged.
/// - Effects of every element that leaves the stack, by any route, are cancelled.
pub struct ForEach<P: Reducer, C: Reducer> {
    parent: P,
    to_state: fn(&mut P::State) -> &mut StackState<C::State>,
    to_action: fn(&P::Action) -> Option<&StackAction<C::State, C::Action>>,
    from_action: fn(StackAction<C::State, C::Action>) -> P::Action,
    child: C,
}

impl<P: Reducer, C: Reducer> ForEach<P, C> {
    pub(crate) fn new(
        parent: P,
        to_state: fn(&mut P::State) -> &mut StackState<C::State>,
        to_action: fn(&P::Action) -> Option<&StackAction<C::State, C::Action>>,
        from_action: fn(StackAction<C::State, C::Action>) -> P::Action,
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

impl<P, C> Reducer for ForEach<P, C>
where
    P: Reducer,
    C: Reducer,
    C::State: Clone,
{
    type State = P::State;
    type Action = P::Action;

    fn reduce(&self, state: &mut P::State, action: &P::Action) -> Effect<P::Action> {
        let before = (self.to_state)(state).identities();

        let effects = match (self.to_action)(action) {
            Some(StackAction::Element {
                id,
                action: child_action,
            }) => {
                let id = *id;
                let Some((navigation, element)) = (self.to_state)(state).entry_mut(id) else {
                    tracing::trace!(?id, action = ?child_action, "action for missing stack element ignored");
                    return Effect::none();
                };
                let from = self.from_action;
                let child = self
                    .child
                    .reduce(element, child_action)
                    .map(move |a| from(StackAction::Element { id, action: a }))
                    .resolve_dismiss(Arc::new(move || from(StackAction::PopFrom { id })))
                    .scoped(navigation);
                let parent = self.parent.reduce(state, action);
                Effect::merge([child, parent])
            }
            Some(StackAction::PopFrom { id }) => {
                if !(self.to_state)(state).contains(*id) {
                    tracing::trace!(?id, "pop for missing stack element ignored");
                    return Effect::none();
                }
                let parent = self.parent.reduce(state, action);
                (self.to_state)(state).pop_from(*id);
                parent
            }
            Some(StackAction::Push { id, state: element }) => {
                let parent = self.parent.reduce(state, action);
                if let Err(error) = (self.to_state)(state).push_with_id(*id, element.clone()) {
                    misuse::report(error);
                }
                parent
            }
            None => self.parent.reduce(state, action),
        };

        let after = (self.to_state)(state).identities();
        let cancellations = before
            .into_iter()
            .filter(|entry| !after.contains(entry))
            .map(|(id, navigation)| {
                tracing::debug!(?id, "stack element removed, cancelling its effects");
                Effect::cancel_id(CancelId::navigation(navigation))
            });
        Effect::merge(std::iter::once(effects).chain(cancellations))
    }
}

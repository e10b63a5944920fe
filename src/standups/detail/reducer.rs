use crate::effect::Effect;
use crate::navigation::PresentationAction;
use crate::reducer::{Reducer, ReducerExt, Scope};
use crate::standups::form::FormReducer;

use super::action::{AlertAction, DestinationAction, DetailAction, DetailDelegate};
use super::state::{ConfirmationAlert, DetailDestination, DetailState};
use crate::standups::form::StandupFormState;

/// Detail-level transitions; the destination child runs before this.
struct DetailCore;

impl Reducer for DetailCore {
    type State = DetailState;
    type Action = DetailAction;

    fn reduce(&self, state: &mut Self::State, action: &Self::Action) -> Effect<Self::Action> {
        match action {
            DetailAction::CancelEditButtonTapped => {
                state.destination.dismiss();
                Effect::none()
            }

            DetailAction::DeleteButtonTapped => {
                state
                    .destination
                    .present(DetailDestination::Alert(ConfirmationAlert::delete_standup()));
                Effect::none()
            }

            DetailAction::DoneEditingButtonTapped => {
                if let Some(DetailDestination::Edit(form)) = state.destination.as_ref() {
                    state.standup = form.standup.clone();
                }
                state.destination.dismiss();
                Effect::none()
            }

            DetailAction::EditButtonTapped => {
                let form = StandupFormState::new(state.standup.clone());
                state.destination.present(DetailDestination::Edit(form));
                Effect::none()
            }

            DetailAction::StartMeetingButtonTapped => {
                Effect::send(DetailAction::Delegate(DetailDelegate::StartMeeting))
            }

            DetailAction::Destination(PresentationAction::Presented(
                DestinationAction::Alert(AlertAction::ConfirmDeletion),
            )) => {
                state.destination.dismiss();
                Effect::send(DetailAction::Delegate(DetailDelegate::DeleteStandup))
            }

            DetailAction::Destination(_) | DetailAction::Delegate(_) => Effect::none(),
        }
    }
}

/// Reducer for the presented destination: only the edit form has logic.
fn destination() -> impl Reducer<State = DetailDestination, Action = DestinationAction> {
    Scope::new(
        |state| match state {
            DetailDestination::Edit(form) => Some(form),
            DetailDestination::Alert(_) => None,
        },
        |action| match action {
            DestinationAction::Edit(action) => Some(action),
            DestinationAction::Alert(_) => None,
        },
        DestinationAction::Edit,
        FormReducer,
    )
}

/// Reducer for [`DetailState`].
pub fn reducer() -> impl Reducer<State = DetailState, Action = DetailAction> {
    DetailCore.if_let(
        |state| &mut state.destination,
        |action| match action {
            DetailAction::Destination(action) => Some(action),
            _ => None,
        },
        DetailAction::Destination,
        destination(),
    )
}

//! Standups list with an "add standup" sheet.
//!
//! Tapping a standup is handled by the app feature, which pushes the detail
//! screen.

use uuid::Uuid;

use crate::dependencies::{dependency, UuidKey};
use crate::effect::Effect;
use crate::navigation::{PresentationAction, PresentationState};
use crate::reducer::{Reduce, Reducer, ReducerExt};
use crate::standups::form::{FormAction, FormReducer, StandupFormState};
use crate::standups::models::Standup;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StandupsListState {
    pub add_standup: PresentationState<StandupFormState>,
    pub standups: Vec<Standup>,
}

impl StandupsListState {
    pub fn new(standups: Vec<Standup>) -> Self {
        Self {
            add_standup: PresentationState::none(),
            standups,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListAction {
    AddStandupButtonTapped,
    ConfirmAddStandupButtonTapped,
    DismissAddStandupButtonTapped,
    AddStandup(PresentationAction<FormAction>),
    StandupTapped(Uuid),
}

fn reduce_list(state: &mut StandupsListState, action: &ListAction) -> Effect<ListAction> {
    match action {
        ListAction::AddStandupButtonTapped => {
            let standup = Standup::new(dependency::<UuidKey>().generate());
            state.add_standup.present(StandupFormState::new(standup));
        }
        ListAction::ConfirmAddStandupButtonTapped => {
            if let Some(form) = state.add_standup.dismiss() {
                let mut standup = form.standup;
                standup.attendees.retain(|a| !a.name.trim().is_empty());
                state.standups.push(standup);
            }
        }
        ListAction::DismissAddStandupButtonTapped => {
            state.add_standup.dismiss();
        }
        ListAction::AddStandup(_) | ListAction::StandupTapped(_) => {}
    }
    Effect::none()
}

/// Reducer for [`StandupsListState`].
pub fn reducer() -> impl Reducer<State = StandupsListState, Action = ListAction> {
    Reduce::new(reduce_list).if_let(
        |state| &mut state.add_standup,
        |action| match action {
            ListAction::AddStandup(action) => Some(action),
            _ => None,
        },
        ListAction::AddStandup,
        FormReducer,
    )
}

use std::time::Duration;

use crate::dependencies::{dependency, ClockKey, DateKey, UuidKey};
use crate::effect::Effect;
use crate::navigation::{StackAction, StackElementId};
use crate::reducer::{Reducer, ReducerExt, Scope};
use crate::standups::clients::DataManagerKey;
use crate::standups::detail::{self, DetailAction, DetailDelegate, DetailState};
use crate::standups::list::{self, ListAction};
use crate::standups::models::{Meeting, Standup};
use crate::standups::record::{RecordAction, RecordDelegate, RecordReducer, RecordState};

use super::action::{AppAction, PathAction};
use super::state::{AppState, PathState};

/// Saves are debounced: a new change restarts the wait.
const SAVE_DEBOUNCE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SaveDebounce;

/// Reacts to what the stacked screens report. Runs after them.
struct AppCore;

impl Reducer for AppCore {
    type State = AppState;
    type Action = AppAction;

    fn reduce(&self, state: &mut Self::State, action: &Self::Action) -> Effect<Self::Action> {
        match action {
            AppAction::Path(StackAction::Element { id, action }) => match action {
                PathAction::Detail(action) => detail_changed(state, *id, action),
                PathAction::Record(RecordAction::Delegate(RecordDelegate::Save { transcript })) => {
                    save_meeting(state, *id, transcript);
                    Effect::none()
                }
                PathAction::Record(_) => Effect::none(),
            },

            AppAction::Path(StackAction::PopFrom { .. } | StackAction::Push { .. }) => {
                Effect::none()
            }

            AppAction::StandupsList(ListAction::StandupTapped(standup_id)) => {
                let standup = state
                    .standups_list
                    .standups
                    .iter()
                    .find(|s| s.id == *standup_id)
                    .cloned();
                match standup {
                    Some(standup) => {
                        state.path.push(PathState::Detail(DetailState::new(standup)));
                    }
                    None => tracing::debug!(%standup_id, "tapped standup no longer listed"),
                }
                Effect::none()
            }

            AppAction::StandupsList(_) => Effect::none(),
        }
    }
}

fn detail_changed(
    state: &mut AppState,
    id: StackElementId,
    action: &DetailAction,
) -> Effect<AppAction> {
    let Some(PathState::Detail(detail)) = state.path.get(id) else {
        return Effect::none();
    };
    let standup = detail.standup.clone();

    match action {
        DetailAction::Delegate(DetailDelegate::DeleteStandup) => {
            state.standups_list.standups.retain(|s| s.id != standup.id);
            state.path.pop_from(id);
        }
        DetailAction::Delegate(DetailDelegate::StartMeeting) => {
            state.path.push(PathState::Record(RecordState::new(standup)));
        }
        _ => sync_standup(state, standup),
    }
    Effect::none()
}

fn save_meeting(state: &mut AppState, id: StackElementId, transcript: &str) {
    state.path.pop_from(id);

    let meeting = Meeting {
        id: dependency::<UuidKey>().generate(),
        date: dependency::<DateKey>().now(),
        transcript: transcript.to_string(),
    };
    let detail = state
        .path
        .iter_mut()
        .filter_map(|(_, screen)| screen.as_detail_mut())
        .last();
    let Some(detail) = detail else {
        tracing::warn!("meeting finished without a detail screen below it");
        return;
    };
    detail.standup.meetings.insert(0, meeting);
    let standup = detail.standup.clone();
    sync_standup(state, standup);
}

/// Write the detail's copy of a standup back into the list.
fn sync_standup(state: &mut AppState, standup: Standup) {
    if let Some(listed) = state
        .standups_list
        .standups
        .iter_mut()
        .find(|s| s.id == standup.id)
    {
        *listed = standup;
    }
}

fn persist(_previous: &Vec<Standup>, state: &mut AppState) -> Effect<AppAction> {
    let standups = state.standups_list.standups.clone();
    let clock = dependency::<ClockKey>();
    let data = dependency::<DataManagerKey>();
    Effect::run(move |_| async move {
        clock.sleep(SAVE_DEBOUNCE).await;
        match data.save_standups(&standups) {
            Ok(()) => tracing::debug!(count = standups.len(), "standups saved"),
            Err(error) => tracing::warn!(%error, "failed to save standups"),
        }
    })
    .cancellable_in_flight(SaveDebounce)
}

fn path() -> impl Reducer<State = PathState, Action = PathAction> {
    Scope::new(
        PathState::as_detail_mut,
        PathAction::as_detail,
        PathAction::Detail,
        detail::reducer(),
    )
    .combine(Scope::new(
        PathState::as_record_mut,
        PathAction::as_record,
        PathAction::Record,
        RecordReducer,
    ))
}

/// Reducer for [`AppState`].
pub fn reducer() -> impl Reducer<State = AppState, Action = AppAction> {
    Scope::new(
        |state: &mut AppState| Some(&mut state.standups_list),
        |action: &AppAction| match action {
            AppAction::StandupsList(action) => Some(action),
            AppAction::Path(_) => None,
        },
        AppAction::StandupsList,
        list::reducer(),
    )
    .combine(AppCore)
    .for_each(
        |state| &mut state.path,
        |action| match action {
            AppAction::Path(action) => Some(action),
            AppAction::StandupsList(_) => None,
        },
        AppAction::Path,
        path(),
    )
    .on_change(|state| state.standups_list.standups.clone(), persist)
}

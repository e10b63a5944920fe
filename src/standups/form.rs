//! Standup editing form.

use uuid::Uuid;

use crate::dependencies::{dependency, UuidKey};
use crate::effect::Effect;
use crate::reducer::Reducer;
use crate::standups::models::{Attendee, Standup};

#[derive(Debug, Clone, PartialEq)]
pub struct StandupFormState {
    pub standup: Standup,
}

impl StandupFormState {
    /// Form over `standup`, with one blank attendee if it has none.
    ///
    /// Reads [`UuidKey`] for the blank attendee's id.
    pub fn new(mut standup: Standup) -> Self {
        if standup.attendees.is_empty() {
            standup
                .attendees
                .push(Attendee::new(dependency::<UuidKey>().generate()));
        }
        Self { standup }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormAction {
    SetTitle(String),
    SetDuration(u64),
    SetAttendeeName { id: Uuid, name: String },
    AddAttendeeButtonTapped,
    DeleteAttendee(Uuid),
}

pub struct FormReducer;

impl Reducer for FormReducer {
    type State = StandupFormState;
    type Action = FormAction;

    fn reduce(&self, state: &mut Self::State, action: &Self::Action) -> Effect<Self::Action> {
        let standup = &mut state.standup;
        match action {
            FormAction::SetTitle(title) => standup.title = title.clone(),
            FormAction::SetDuration(seconds) => standup.duration_secs = *seconds,
            FormAction::SetAttendeeName { id, name } => {
                if let Some(attendee) = standup.attendees.iter_mut().find(|a| a.id == *id) {
                    attendee.name = name.clone();
                }
            }
            FormAction::AddAttendeeButtonTapped => {
                let id = dependency::<UuidKey>().generate();
                standup.attendees.push(Attendee::new(id));
            }
            FormAction::DeleteAttendee(id) => {
                standup.attendees.retain(|a| a.id != *id);
                // A standup always keeps at least one attendee row.
                if standup.attendees.is_empty() {
                    let id = dependency::<UuidKey>().generate();
                    standup.attendees.push(Attendee::new(id));
                }
            }
        }
        Effect::none()
    }
}

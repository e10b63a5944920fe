use crate::navigation::PresentationState;
use crate::standups::form::StandupFormState;
use crate::standups::models::Standup;

#[derive(Debug, Clone, PartialEq)]
pub struct DetailState {
    pub destination: PresentationState<DetailDestination>,
    pub standup: Standup,
}

impl DetailState {
    pub fn new(standup: Standup) -> Self {
        Self {
            destination: PresentationState::none(),
            standup,
        }
    }
}

/// What the detail screen presents on top of itself.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailDestination {
    Alert(ConfirmationAlert),
    Edit(StandupFormState),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationAlert {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
}

impl ConfirmationAlert {
    pub fn delete_standup() -> Self {
        Self {
            title: "Delete?".to_string(),
            message: "Are you sure you want to delete this meeting?".to_string(),
            confirm_label: "Yes".to_string(),
        }
    }
}

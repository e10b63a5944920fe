use crate::navigation::PresentationAction;
use crate::standups::form::FormAction;

#[derive(Debug, Clone, PartialEq)]
pub enum DetailAction {
    CancelEditButtonTapped,
    DeleteButtonTapped,
    DoneEditingButtonTapped,
    EditButtonTapped,
    StartMeetingButtonTapped,
    Destination(PresentationAction<DestinationAction>),
    Delegate(DetailDelegate),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DestinationAction {
    Alert(AlertAction),
    Edit(FormAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertAction {
    ConfirmDeletion,
}

/// Requests handled by the screen that pushed the detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailDelegate {
    DeleteStandup,
    StartMeeting,
}

use crate::standups::clients::{SpeechError, SpeechRecognitionResult};

#[derive(Debug, Clone, PartialEq)]
pub enum RecordAction {
    /// Screen appeared: start recognition and the timer.
    Task,
    TimerTick,
    SpeechResult(SpeechRecognitionResult),
    SpeechFailure(SpeechError),
    EndMeetingButtonTapped,
    DiscardMeetingButtonTapped,
    Delegate(RecordDelegate),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordDelegate {
    Save { transcript: String },
}

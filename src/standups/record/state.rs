use crate::standups::models::Standup;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordState {
    pub seconds_elapsed: u64,
    pub speaker_index: usize,
    pub speech_error: Option<String>,
    pub standup: Standup,
    pub transcript: String,
}

impl RecordState {
    pub fn new(standup: Standup) -> Self {
        Self {
            seconds_elapsed: 0,
            speaker_index: 0,
            speech_error: None,
            standup,
            transcript: String::new(),
        }
    }

    pub fn seconds_remaining(&self) -> u64 {
        self.standup.duration_secs.saturating_sub(self.seconds_elapsed)
    }
}

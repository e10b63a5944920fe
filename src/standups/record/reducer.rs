use std::time::Duration;

use futures::StreamExt;

use crate::dependencies::{dependency, ClockKey};
use crate::effect::Effect;
use crate::reducer::Reducer;
use crate::standups::clients::{SpeechAuthorization, SpeechClientKey};

use super::action::{RecordAction, RecordDelegate};
use super::state::RecordState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RecordCancel {
    Speech,
    Timer,
}

pub struct RecordReducer;

impl Reducer for RecordReducer {
    type State = RecordState;
    type Action = RecordAction;

    fn reduce(&self, state: &mut Self::State, action: &Self::Action) -> Effect<Self::Action> {
        match action {
            RecordAction::Task => Effect::merge([speech(), timer()]),

            RecordAction::TimerTick => {
                state.seconds_elapsed += 1;
                if state.seconds_elapsed % state.standup.seconds_per_attendee() != 0 {
                    return Effect::none();
                }
                let last = state.standup.attendees.len().saturating_sub(1);
                if state.speaker_index >= last {
                    return Effect::merge([
                        Effect::cancel(RecordCancel::Timer),
                        Effect::send(RecordAction::Delegate(RecordDelegate::Save {
                            transcript: state.transcript.clone(),
                        })),
                    ]);
                }
                state.speaker_index += 1;
                Effect::none()
            }

            RecordAction::SpeechResult(result) => {
                state.transcript = result.best_transcription.formatted_string.clone();
                Effect::none()
            }

            RecordAction::SpeechFailure(error) => {
                tracing::warn!(%error, "speech recognition stopped");
                state.speech_error = Some(error.to_string());
                Effect::none()
            }

            RecordAction::EndMeetingButtonTapped => {
                Effect::send(RecordAction::Delegate(RecordDelegate::Save {
                    transcript: state.transcript.clone(),
                }))
            }

            RecordAction::DiscardMeetingButtonTapped => Effect::dismiss(),

            RecordAction::Delegate(_) => Effect::none(),
        }
    }
}

fn speech() -> Effect<RecordAction> {
    let client = dependency::<SpeechClientKey>();
    if client.authorization() != SpeechAuthorization::Authorized {
        tracing::info!("speech recognition not authorized, recording without transcript");
        return Effect::none();
    }
    Effect::run(move |emitter| async move {
        let mut results = client.start_task();
        while let Some(result) = results.next().await {
            match result {
                Ok(result) => emitter.emit(RecordAction::SpeechResult(result)),
                Err(error) => {
                    emitter.emit(RecordAction::SpeechFailure(error));
                    break;
                }
            }
        }
    })
    .cancellable(RecordCancel::Speech)
}

fn timer() -> Effect<RecordAction> {
    let clock = dependency::<ClockKey>();
    Effect::run(move |emitter| async move {
        while !emitter.is_cancelled() {
            clock.sleep(Duration::from_secs(1)).await;
            emitter.emit(RecordAction::TimerTick);
        }
    })
    .cancellable(RecordCancel::Timer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standups::models::{Attendee, Standup};
    use uuid::Uuid;

    fn state(attendees: u128, duration_secs: u64) -> RecordState {
        let mut standup = Standup::new(Uuid::nil());
        standup.attendees = (0..attendees).map(|n| Attendee::new(Uuid::from_u128(n))).collect();
        standup.duration_secs = duration_secs;
        RecordState::new(standup)
    }

    #[test]
    fn ticks_rotate_speakers_then_save() {
        let mut state = state(3, 6);
        state.transcript = "hello".to_string();

        for tick in 1..=5 {
            let effect = RecordReducer.reduce(&mut state, &RecordAction::TimerTick);
            assert!(effect.is_none(), "tick {tick} should not finish the meeting");
        }
        assert_eq!(state.speaker_index, 2);
        assert_eq!(state.seconds_remaining(), 1);

        let effect = RecordReducer.reduce(&mut state, &RecordAction::TimerTick);
        assert!(!effect.is_none());
        assert_eq!(state.seconds_elapsed, 6);
        assert_eq!(state.speaker_index, 2);
    }

    #[test]
    fn speech_result_replaces_transcript() {
        let mut state = state(1, 60);
        let result = crate::standups::clients::SpeechRecognitionResult::final_result("done");
        let _ = RecordReducer.reduce(&mut state, &RecordAction::SpeechResult(result));
        assert_eq!(state.transcript, "done");
    }
}

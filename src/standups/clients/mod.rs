//! Dependencies of the standups features.

mod data;
mod speech;

pub use data::{DataError, DataManager, DataManagerKey};
pub use speech::{
    SpeechAuthorization, SpeechClient, SpeechClientKey, SpeechError, SpeechRecognitionResult,
    Transcription,
};

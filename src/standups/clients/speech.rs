use std::fmt;
use std::sync::Arc;

use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use thiserror::Error;

use crate::dependencies::DependencyKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechAuthorization {
    Authorized,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcription {
    pub formatted_string: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRecognitionResult {
    pub best_transcription: Transcription,
    pub is_final: bool,
}

impl SpeechRecognitionResult {
    pub fn final_result(text: impl Into<String>) -> Self {
        Self {
            best_transcription: Transcription {
                formatted_string: text.into(),
            },
            is_final: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    #[error("speech recognition is not authorized")]
    NotAuthorized,
    #[error("speech recognizer failed: {0}")]
    Recognizer(String),
}

type ResultStream = BoxStream<'static, Result<SpeechRecognitionResult, SpeechError>>;

/// Live transcription of the meeting audio.
#[derive(Clone)]
pub struct SpeechClient {
    authorization: Arc<dyn Fn() -> SpeechAuthorization + Send + Sync>,
    start_task: Arc<dyn Fn() -> ResultStream + Send + Sync>,
}

impl SpeechClient {
    pub fn new(
        authorization: impl Fn() -> SpeechAuthorization + Send + Sync + 'static,
        start_task: impl Fn() -> ResultStream + Send + Sync + 'static,
    ) -> Self {
        Self {
            authorization: Arc::new(authorization),
            start_task: Arc::new(start_task),
        }
    }

    /// Authorized client yielding `results` and finishing.
    pub fn scripted(results: Vec<SpeechRecognitionResult>) -> Self {
        Self::new(
            || SpeechAuthorization::Authorized,
            move || stream::iter(results.clone().into_iter().map(Ok)).boxed(),
        )
    }

    /// Authorized client whose recognizer fails immediately.
    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(
            || SpeechAuthorization::Authorized,
            move || {
                let error = SpeechError::Recognizer(message.clone());
                stream::once(future::ready(Err(error))).boxed()
            },
        )
    }

    pub fn denied() -> Self {
        Self::new(
            || SpeechAuthorization::Denied,
            || stream::once(future::ready(Err(SpeechError::NotAuthorized))).boxed(),
        )
    }

    pub fn authorization(&self) -> SpeechAuthorization {
        (self.authorization)()
    }

    pub fn start_task(&self) -> ResultStream {
        (self.start_task)()
    }
}

impl fmt::Debug for SpeechClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SpeechClient")
    }
}

/// Has no live implementation; the binary and tests provide one.
pub struct SpeechClientKey;

impl DependencyKey for SpeechClientKey {
    type Value = SpeechClient;

    fn test_value() -> Self::Value {
        SpeechClient::denied()
    }
}

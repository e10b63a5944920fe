use std::time::Duration;

use thiserror::Error;

/// Assertion failure reported by a [`TestStore`](super::TestStore).
#[derive(Debug, Error)]
pub enum TestStoreFailure {
    #[error("state after {context} does not match the expectation (-expected +actual):\n{diff}")]
    StateMismatch { context: String, diff: String },

    #[error(
        "must handle {} received action(s) before sending an action:\n  {}",
        .actions.len(),
        .actions.join("\n  ")
    )]
    UnhandledReceivedActions { actions: Vec<String> },

    #[error("received unexpected action {actual} (-expected +actual):\n{diff}")]
    UnexpectedAction { actual: String, diff: String },

    #[error("expected to receive {expected} but no action arrived within {timeout:?}")]
    ReceiveTimeout { expected: String, timeout: Duration },

    #[error(
        "the store received {} unexpected action(s):\n  {}",
        .actions.len(),
        .actions.join("\n  ")
    )]
    UnreceivedActions { actions: Vec<String> },

    #[error(
        "{} effect(s) still running, started by:\n  {}",
        .origins.len(),
        .origins.join("\n  ")
    )]
    EffectsStillRunning { origins: Vec<String> },
}

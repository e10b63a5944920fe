//! Programmer-misuse reporting.
//!
//! Misuse means a missing wiring step (a dependency without a live value, an
//! effect started outside a runtime, a reused stack id). It is fatal in
//! debug and test builds and logged in release builds unless configured
//! otherwise.

use std::fmt::Display;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MisusePolicy {
    /// Panic at the call site.
    Panic,
    /// Emit an `error` level trace and continue.
    Log,
}

const UNSET: u8 = 0;
const PANIC: u8 = 1;
const LOG: u8 = 2;

static POLICY: AtomicU8 = AtomicU8::new(UNSET);

impl MisusePolicy {
    /// Policy used when nothing was configured.
    pub fn build_default() -> Self {
        if cfg!(debug_assertions) {
            MisusePolicy::Panic
        } else {
            MisusePolicy::Log
        }
    }
}

pub fn set_policy(policy: MisusePolicy) {
    let raw = match policy {
        MisusePolicy::Panic => PANIC,
        MisusePolicy::Log => LOG,
    };
    POLICY.store(raw, Ordering::SeqCst);
}

/// Forget any configured policy and fall back to [`MisusePolicy::build_default`].
pub fn reset_policy() {
    POLICY.store(UNSET, Ordering::SeqCst);
}

pub fn policy() -> MisusePolicy {
    match POLICY.load(Ordering::SeqCst) {
        PANIC => MisusePolicy::Panic,
        LOG => MisusePolicy::Log,
        _ => MisusePolicy::build_default(),
    }
}

/// Report a misuse according to the current policy.
#[track_caller]
pub fn report(message: impl Display) {
    match policy() {
        MisusePolicy::Panic => panic!("{message}"),
        MisusePolicy::Log => {
            let location = std::panic::Location::caller();
            tracing::error!(
                location = %location,
                "{}",
                message
            );
        }
    }
}

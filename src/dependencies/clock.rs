use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::time::Instant;

use super::DependencyKey;

/// Source of time for effects that sleep or tick.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// Wall clock backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        tokio::time::sleep(duration).boxed()
    }
}

/// Clock whose sleeps complete after a single scheduler yield.
///
/// `now()` advances by every slept duration, so timing logic still sees time pass.
#[derive(Debug)]
pub struct ImmediateClock {
    now: Arc<Mutex<Instant>>,
}

impl ImmediateClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }
}

impl Default for ImmediateClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ImmediateClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        let now = Arc::clone(&self.now);
        async move {
            *now.lock() += duration;
            tokio::task::yield_now().await;
        }
        .boxed()
    }
}

pub struct ClockKey;

impl DependencyKey for ClockKey {
    type Value = Arc<dyn Clock>;

    fn test_value() -> Self::Value {
        Arc::new(ImmediateClock::new())
    }

    fn live_value() -> Option<Self::Value> {
        Some(Arc::new(TokioClock))
    }
}

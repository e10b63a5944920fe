use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::effect::{CancelId, CancellationToken};

/// Book-keeping for every effect a store has started.
///
/// An effect counts as in flight from the moment it is started until its task
/// finishes or its token is cancelled, whichever comes first.
#[derive(Default)]
pub(crate) struct EffectRegistry {
    inner: Mutex<RegistryInner>,
    settled: Notify,
}

#[derive(Default)]
struct RegistryInner {
    next_effect: u64,
    next_registration: u64,
    running: HashMap<u64, Running>,
    keys: HashMap<CancelId, Vec<(u64, CancellationToken)>>,
}

struct Running {
    origin: String,
    token: CancellationToken,
}

impl EffectRegistry {
    pub(crate) fn begin(&self, origin: String, token: CancellationToken) -> u64 {
        let mut inner = self.inner.lock();
        let id = inner.next_effect;
        inner.next_effect += 1;
        inner.running.insert(id, Running { origin, token });
        id
    }

    pub(crate) fn end(&self, effect: u64) {
        let empty = {
            let mut inner = self.inner.lock();
            inner.running.remove(&effect);
            inner.running.is_empty()
        };
        if empty {
            self.settled.notify_waiters();
        }
    }

    /// Track `token` under `id` until [`unregister`](Self::unregister).
    pub(crate) fn register(&self, id: CancelId, token: CancellationToken) -> u64 {
        let mut inner = self.inner.lock();
        let registration = inner.next_registration;
        inner.next_registration += 1;
        inner.keys.entry(id).or_default().push((registration, token));
        registration
    }

    pub(crate) fn unregister(&self, id: &CancelId, registration: u64) {
        let mut inner = self.inner.lock();
        if let Some(tokens) = inner.keys.get_mut(id) {
            tokens.retain(|(r, _)| *r != registration);
            if tokens.is_empty() {
                inner.keys.remove(id);
            }
        }
    }

    /// Cancel everything registered under `id`. Returns how many registrations were hit.
    pub(crate) fn cancel(&self, id: &CancelId) -> usize {
        let tokens = self.inner.lock().keys.remove(id).unwrap_or_default();
        let count = tokens.len();
        for (_, token) in tokens {
            token.cancel();
        }
        if count > 0 {
            tracing::debug!(id = ?id, count, "cancelled effects");
            self.prune();
        }
        count
    }

    pub(crate) fn cancel_all(&self) {
        let tokens: Vec<CancellationToken> = {
            let mut inner = self.inner.lock();
            inner.keys.clear();
            inner.running.values().map(|r| r.token.clone()).collect()
        };
        for token in tokens {
            token.cancel();
        }
        self.prune();
    }

    /// Drop running entries whose token was cancelled.
    pub(crate) fn prune(&self) {
        let empty = {
            let mut inner = self.inner.lock();
            inner.running.retain(|_, r| !r.token.is_cancelled());
            inner.running.is_empty()
        };
        if empty {
            self.settled.notify_waiters();
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.inner
            .lock()
            .running
            .values()
            .filter(|r| !r.token.is_cancelled())
            .count()
    }

    /// Debug descriptions of the actions that started each in-flight effect.
    pub(crate) fn origins(&self) -> Vec<String> {
        let inner = self.inner.lock();
        let mut running: Vec<_> = inner
            .running
            .iter()
            .filter(|(_, r)| !r.token.is_cancelled())
            .collect();
        running.sort_by_key(|(id, _)| **id);
        running.into_iter().map(|(_, r)| r.origin.clone()).collect()
    }

    /// Resolve once nothing is in flight.
    pub(crate) async fn settled(&self) {
        loop {
            let notified = self.settled.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            self.prune();
            if self.len() == 0 {
                return;
            }
            notified.await;
        }
    }
}

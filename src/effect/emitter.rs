use std::sync::Arc;

use super::CancellationToken;

type Deliver<A> = Arc<dyn Fn(A, &CancellationToken) + Send + Sync>;

/// Handle through which a running effect feeds actions back into its store.
///
/// Emitting after the effect was cancelled is a silent no-op. Every delivery
/// carries the emitting token, so a store can still drop an action that was
/// queued before a cancel but not yet reduced.
pub struct Emitter<A> {
    deliver: Deliver<A>,
    token: CancellationToken,
}

impl<A> Clone for Emitter<A> {
    fn clone(&self) -> Self {
        Self {
            deliver: Arc::clone(&self.deliver),
            token: self.token.clone(),
        }
    }
}

impl<A: Send + 'static> Emitter<A> {
    pub fn new(deliver: impl Fn(A) + Send + Sync + 'static, token: CancellationToken) -> Self {
        Self::tagged(move |action, _| deliver(action), token)
    }

    /// Like [`Emitter::new`], but `deliver` also sees the token of the
    /// emitting effect.
    pub(crate) fn tagged(
        deliver: impl Fn(A, &CancellationToken) + Send + Sync + 'static,
        token: CancellationToken,
    ) -> Self {
        Self {
            deliver: Arc::new(deliver),
            token,
        }
    }

    pub fn emit(&self, action: A) {
        if self.token.is_cancelled() {
            tracing::trace!("dropping action emitted by a cancelled effect");
            return;
        }
        (self.deliver)(action, &self.token);
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolve once the emitting effect is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub(crate) fn with_token(&self, token: CancellationToken) -> Self {
        Self {
            deliver: Arc::clone(&self.deliver),
            token,
        }
    }

    /// Emitter for a child action type, translating through `transform`.
    pub(crate) fn contramap<C: Send + 'static>(
        self,
        transform: Arc<dyn Fn(C) -> A + Send + Sync>,
    ) -> Emitter<C> {
        let deliver = self.deliver;
        Emitter {
            deliver: Arc::new(move |action, token| deliver(transform(action), token)),
            token: self.token,
        }
    }
}

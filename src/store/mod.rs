//! The runtime: owns state, serializes actions through the reducer and runs
//! effects on tokio.
//!
//! Actions sent from any thread are processed one at a time, in send order. An
//! action sent while another is being processed (from an effect, or from a
//! synchronous `Effect::send`) is queued and handled by the thread already
//! draining the queue. Observers are notified once per drained batch.

mod effects;
mod lifecycle;
mod root;
mod runner;
mod scoped;

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::RuntimeConfig;
use crate::dependencies::DependencyValues;
use crate::effect::{CancelId, CancelKey, CancellationToken};
use crate::identity::StateId;
use crate::reducer::{Action, Reducer, State};

use self::effects::EffectRegistry;
use self::root::RootCore;
use self::scoped::ScopedCore;

pub use self::lifecycle::{DismissReason, LifecycleEvent, PresentationStore, StackStore};

/// Receives a callback after every processed batch of actions.
pub trait StoreObserver: Send + Sync {
    fn state_did_change(&self);
}

pub(crate) type DismissHook = Box<dyn FnOnce(DismissReason) + Send>;

pub(crate) trait StoreCore<S, A>: Send + Sync {
    fn send(&self, action: A) -> StoreTask;
    fn read(&self, reader: &mut dyn FnMut(&S));
    fn shared(&self) -> &Arc<Shared>;

    fn invalidate(&self) {}

    fn is_invalidated(&self) -> bool {
        false
    }

    /// Navigation identities enclosing this store, outermost first.
    fn navigation_path(&self) -> Vec<StateId> {
        Vec::new()
    }

    /// A root store is never dismissed, so its hooks never run.
    fn on_dismiss(&self, _hook: DismissHook) {}

    fn notify_dismissed(&self, _reason: DismissReason) {}

    fn dismissal(&self) -> Option<DismissReason> {
        None
    }
}

/// State shared by a root store and every store scoped from it.
pub(crate) struct Shared {
    pub(crate) effects: Arc<EffectRegistry>,
    version: watch::Sender<u64>,
    observers: Mutex<Vec<Weak<dyn StoreObserver>>>,
}

impl Shared {
    fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            effects: Arc::new(EffectRegistry::default()),
            version,
            observers: Mutex::new(Vec::new()),
        }
    }

    fn did_change(&self) {
        self.version.send_modify(|version| *version += 1);
        let observers: Vec<Arc<dyn StoreObserver>> = {
            let mut observers = self.observers.lock();
            observers.retain(|o| o.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };
        for observer in observers {
            observer.state_did_change();
        }
    }
}

/// Handle to a store. Cheap to clone; clones share state.
pub struct Store<S, A> {
    pub(crate) core: Arc<dyn StoreCore<S, A>>,
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<S: State, A: Action> Store<S, A> {
    pub fn new<R>(initial: S, reducer: R) -> Self
    where
        R: Reducer<State = S, Action = A>,
    {
        Self::builder(initial, reducer).build()
    }

    /// Start configuring a root store. Captures the current dependency scope,
    /// tokio runtime and configuration.
    pub fn builder<R>(initial: S, reducer: R) -> StoreBuilder<S, A>
    where
        R: Reducer<State = S, Action = A>,
    {
        StoreBuilder {
            state: initial,
            reducer: Box::new(reducer),
            dependencies: DependencyValues::current(),
            runtime: Handle::try_current().ok(),
            log_actions: RuntimeConfig::current().store.log_actions,
        }
    }

    /// Process `action` and everything it synchronously triggers.
    ///
    /// The returned task tracks the asynchronous effects started along the way.
    pub fn send(&self, action: A) -> StoreTask {
        self.core.send(action)
    }

    pub fn with_state<R>(&self, read: impl FnOnce(&S) -> R) -> R {
        let mut read = Some(read);
        let mut output = None;
        self.core.read(&mut |state| {
            if let Some(read) = read.take() {
                output = Some(read(state));
            }
        });
        match output {
            Some(output) => output,
            None => unreachable!("store core did not invoke the state reader"),
        }
    }

    pub fn state(&self) -> S
    where
        S: Clone,
    {
        self.with_state(S::clone)
    }

    /// Derive a store over a projection of this store's state.
    pub fn scope<C, CA>(
        &self,
        to_child: impl Fn(&S) -> C + Send + Sync + 'static,
        from_child: impl Fn(CA) -> A + Send + Sync + 'static,
    ) -> Store<C, CA>
    where
        C: Clone + Send + 'static,
        CA: Action,
    {
        let initial = self.with_state(&to_child);
        Store {
            core: Arc::new(ScopedCore::new(
                self.clone(),
                initial,
                Box::new(move |state: &S| Some(to_child(state))),
                Box::new(from_child),
                None,
            )),
        }
    }

    /// Derive a store over optional child state. `None` if the child is absent now.
    ///
    /// Once the child disappears the derived store keeps its last value and
    /// actions sent through it are dropped.
    pub fn scope_optional<C, CA>(
        &self,
        to_child: impl Fn(&S) -> Option<C> + Send + Sync + 'static,
        from_child: impl Fn(CA) -> A + Send + Sync + 'static,
    ) -> Option<Store<C, CA>>
    where
        C: Clone + Send + 'static,
        CA: Action,
    {
        let initial = self.with_state(&to_child)?;
        Some(Store {
            core: Arc::new(ScopedCore::new(
                self.clone(),
                initial,
                Box::new(to_child),
                Box::new(from_child),
                None,
            )),
        })
    }

    pub fn subscribe(&self) -> StateSubscription {
        StateSubscription {
            receiver: self.core.shared().version.subscribe(),
        }
    }

    /// Register a weakly held observer; it is dropped once the observer is.
    pub fn observe(&self, observer: Weak<dyn StoreObserver>) {
        self.core.shared().observers.lock().push(observer);
    }

    /// Resolve once `predicate` holds for the current state.
    pub async fn wait_for(&self, predicate: impl Fn(&S) -> bool) {
        let mut subscription = self.subscribe();
        loop {
            if self.with_state(&predicate) {
                return;
            }
            if !subscription.changed().await {
                return;
            }
        }
    }

    /// Cancel every in-flight effect registered under `key`.
    ///
    /// On a presented or stacked child store the key is resolved inside that
    /// child's navigation scope, matching what its reducer registered.
    pub fn cancel<K: CancelKey>(&self, key: K) -> usize {
        self.core
            .shared()
            .effects
            .cancel(&self.scoped_id(CancelId::new(key)))
    }

    pub fn in_flight_count(&self) -> usize {
        self.core.shared().effects.len()
    }

    /// Resolve once no effect is in flight.
    pub async fn settle(&self) {
        self.core.shared().effects.settled().await
    }

    pub fn is_invalidated(&self) -> bool {
        self.core.is_invalidated()
    }

    /// Run `hook` once this store's presentation or stack element goes away,
    /// before the store stops forwarding actions. Runs right away if that
    /// already happened. Stores that are not navigation children pass the
    /// hook to the nearest enclosing one.
    ///
    /// The hook runs during the parent's change notification and must not
    /// send actions.
    pub fn on_dismiss(&self, hook: impl FnOnce(DismissReason) + Send + 'static) {
        self.core.on_dismiss(Box::new(hook));
    }

    /// Why this store's navigation child was dismissed, if it was.
    pub fn dismissal(&self) -> Option<DismissReason> {
        self.core.dismissal()
    }

    pub(crate) fn invalidate(&self) {
        self.core.invalidate();
    }

    pub(crate) fn notify_dismissed(&self, reason: DismissReason) {
        self.core.notify_dismissed(reason);
    }

    /// `id` moved inside every navigation scope enclosing this store.
    pub(crate) fn scoped_id(&self, id: CancelId) -> CancelId {
        self.core
            .navigation_path()
            .into_iter()
            .rev()
            .fold(id, CancelId::within)
    }

    /// Like [`scope_optional`](Self::scope_optional), for the child living
    /// under `navigation`.
    pub(crate) fn scope_navigation<C, CA>(
        &self,
        navigation: StateId,
        to_child: impl Fn(&S) -> Option<C> + Send + Sync + 'static,
        from_child: impl Fn(CA) -> A + Send + Sync + 'static,
    ) -> Option<Store<C, CA>>
    where
        C: Clone + Send + 'static,
        CA: Action,
    {
        let initial = self.with_state(&to_child)?;
        Some(Store {
            core: Arc::new(ScopedCore::new(
                self.clone(),
                initial,
                Box::new(to_child),
                Box::new(from_child),
                Some(navigation),
            )),
        })
    }

    pub(crate) fn effects(&self) -> &Arc<EffectRegistry> {
        &self.core.shared().effects
    }
}

pub struct StoreBuilder<S: State, A: Action> {
    state: S,
    reducer: Box<dyn Reducer<State = S, Action = A>>,
    dependencies: DependencyValues,
    runtime: Option<Handle>,
    log_actions: bool,
}

impl<S: State, A: Action> StoreBuilder<S, A> {
    /// Override dependencies for every reducer call and effect of this store.
    pub fn dependencies(mut self, update: impl FnOnce(&mut DependencyValues)) -> Self {
        update(&mut self.dependencies);
        self
    }

    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub fn log_actions(mut self, enabled: bool) -> Self {
        self.log_actions = enabled;
        self
    }

    pub fn build(self) -> Store<S, A> {
        let core: Arc<dyn StoreCore<S, A>> = RootCore::new(
            self.state,
            self.reducer,
            self.dependencies,
            self.runtime,
            self.log_actions,
        );
        Store { core }
    }
}

struct Launched {
    handle: JoinHandle<()>,
    token: CancellationToken,
}

/// The asynchronous effects started by one `send`.
#[derive(Default)]
pub struct StoreTask {
    launched: Vec<Launched>,
}

impl StoreTask {
    pub(crate) fn empty() -> Self {
        Self::default()
    }

    fn push(&mut self, handle: JoinHandle<()>, token: CancellationToken) {
        self.launched.push(Launched { handle, token });
    }

    pub fn has_effects(&self) -> bool {
        !self.launched.is_empty()
    }

    pub fn cancel(&self) {
        for launched in &self.launched {
            launched.token.cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.has_effects() && self.launched.iter().all(|l| l.token.is_cancelled())
    }

    /// Wait for every effect to finish or be cancelled.
    pub async fn finish(self) {
        for launched in self.launched {
            if let Err(err) = launched.handle.await {
                if err.is_panic() {
                    tracing::warn!(error = %err, "effect task panicked");
                }
            }
        }
    }
}

impl std::fmt::Debug for StoreTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreTask")
            .field("effects", &self.launched.len())
            .finish()
    }
}

/// Change notifications for a store family.
pub struct StateSubscription {
    receiver: watch::Receiver<u64>,
}

impl StateSubscription {
    /// Wait for the next processed batch. Returns false once the store is gone.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }

    /// Number of batches processed so far.
    pub fn version(&self) -> u64 {
        *self.receiver.borrow()
    }
}

//! Assertion harness driving a reducer through a real store.
//!
//! Every action the store processes is recorded with the state it produced.
//! Tests then assert, step by step, how state changed after each sent action
//! and which actions effects fed back.

mod diff;
mod failure;

use std::collections::VecDeque;
use std::fmt::{self, Debug};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::Instant;

use crate::config::{ExhaustivityMode, RuntimeConfig};
use crate::dependencies::{DependencyContext, DependencyValues};
use crate::effect::Effect;
use crate::reducer::{Action, Reducer, State};
use crate::store::{Store, StoreTask};

pub use failure::TestStoreFailure;

/// How strictly a [`TestStore`] checks state changes and received actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exhaustivity {
    /// Every change and every received action must be asserted.
    On,
    /// Only the asserted parts are checked.
    Off { show_skipped_assertions: bool },
}

impl Exhaustivity {
    fn from_config(config: &RuntimeConfig) -> Self {
        match config.test_store.exhaustivity {
            ExhaustivityMode::On => Exhaustivity::On,
            ExhaustivityMode::Off => Exhaustivity::Off {
                show_skipped_assertions: config.test_store.show_skipped_assertions,
            },
        }
    }
}

/// Whether an action was sent by the test or fed back by an effect.
#[derive(Clone, PartialEq)]
pub(crate) enum TestAction<A> {
    Send(A),
    Receive(A),
}

impl<A: Debug> Debug for TestAction<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestAction::Send(action) | TestAction::Receive(action) => action.fmt(f),
        }
    }
}

struct Recorded<S, A> {
    sent: Option<S>,
    received: VecDeque<(A, S)>,
}

struct Recorder<S, A> {
    recorded: Mutex<Recorded<S, A>>,
    changed: Notify,
}

impl<S, A> Recorder<S, A> {
    fn new() -> Self {
        Self {
            recorded: Mutex::new(Recorded {
                sent: None,
                received: VecDeque::new(),
            }),
            changed: Notify::new(),
        }
    }

    /// Wait until `ready` holds or `deadline` passes.
    async fn wait(&self, deadline: Instant, ready: impl Fn(&Recorded<S, A>) -> bool) -> bool {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if ready(&self.recorded.lock()) {
                return true;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return ready(&self.recorded.lock());
            }
        }
    }
}

/// Runs the feature reducer and records what each action produced.
struct TestReducer<R: Reducer> {
    base: R,
    recorder: Arc<Recorder<R::State, R::Action>>,
}

impl<R> Reducer for TestReducer<R>
where
    R: Reducer,
    R::State: Clone,
    R::Action: Clone,
{
    type State = R::State;
    type Action = TestAction<R::Action>;

    fn reduce(&self, state: &mut Self::State, action: &Self::Action) -> Effect<Self::Action> {
        let effect = match action {
            TestAction::Send(action) => {
                let effect = self.base.reduce(state, action);
                self.recorder.recorded.lock().sent = Some(state.clone());
                effect
            }
            TestAction::Receive(action) => {
                let effect = self.base.reduce(state, action);
                self.recorder
                    .recorded
                    .lock()
                    .received
                    .push_back((action.clone(), state.clone()));
                effect
            }
        };
        self.recorder.changed.notify_waiters();
        effect.map(TestAction::Receive)
    }
}

/// Store wrapper asserting state changes and effect feedback.
///
/// Runs in the test dependency context. Dropping a test store that still has
/// unasserted received actions or running effects fails the test in
/// exhaustive mode; call [`TestStore::finish`] first when effects outlive the
/// last assertion.
pub struct TestStore<S, A>
where
    S: State + Clone + PartialEq + Debug,
    A: Action + Clone + PartialEq,
{
    store: Store<S, TestAction<A>>,
    recorder: Arc<Recorder<S, A>>,
    asserted: S,
    exhaustivity: Exhaustivity,
    timeout: Duration,
    torn_down: bool,
}

impl<S, A> TestStore<S, A>
where
    S: State + Clone + PartialEq + Debug,
    A: Action + Clone + PartialEq,
{
    pub fn new<R>(initial: S, reducer: R) -> Self
    where
        R: Reducer<State = S, Action = A>,
    {
        Self::with_dependencies(initial, reducer, |_| {})
    }

    /// Build with dependency overrides applied on top of the test context.
    pub fn with_dependencies<R>(
        initial: S,
        reducer: R,
        update: impl FnOnce(&mut DependencyValues),
    ) -> Self
    where
        R: Reducer<State = S, Action = A>,
    {
        let config = RuntimeConfig::current();
        let recorder = Arc::new(Recorder::new());
        let reducer = TestReducer {
            base: reducer,
            recorder: Arc::clone(&recorder),
        };
        let store = Store::builder(initial.clone(), reducer)
            .dependencies(|values| {
                values.set_context(DependencyContext::Test);
                update(values);
            })
            .build();
        Self {
            store,
            recorder,
            asserted: initial,
            exhaustivity: Exhaustivity::from_config(&config),
            timeout: Duration::from_millis(config.test_store.receive_timeout_ms),
            torn_down: false,
        }
    }

    pub fn exhaustivity(&self) -> Exhaustivity {
        self.exhaustivity
    }

    pub fn set_exhaustivity(&mut self, exhaustivity: Exhaustivity) {
        self.exhaustivity = exhaustivity;
    }

    /// How long `receive` waits for an effect action.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Current state of the underlying store.
    pub fn state(&self) -> S {
        self.store.state()
    }

    /// Send `action` and assert the state it produced.
    ///
    /// `update` receives the state as of the previous assertion and must turn
    /// it into the expected state.
    pub async fn try_send(
        &mut self,
        action: A,
        update: impl FnMut(&mut S),
    ) -> Result<StoreTask, TestStoreFailure> {
        let pending = self.drain_received();
        if !pending.is_empty() {
            match self.exhaustivity {
                Exhaustivity::On => {
                    let actions = pending.iter().map(|(a, _)| format!("{a:?}")).collect();
                    self.restore_received(pending);
                    return Err(TestStoreFailure::UnhandledReceivedActions { actions });
                }
                Exhaustivity::Off {
                    show_skipped_assertions,
                } => self.skip(pending, show_skipped_assertions),
            }
        }

        let context = format!("sending {action:?}");
        self.recorder.recorded.lock().sent = None;
        let task = self.store.send(TestAction::Send(action));
        let deadline = Instant::now() + self.timeout;
        // Another thread may be draining the store; our action is then
        // processed there.
        self.recorder.wait(deadline, |r| r.sent.is_some()).await;
        let sent = self.recorder.recorded.lock().sent.take();
        let actual = sent.unwrap_or_else(|| self.store.state());
        self.assert_state(&context, actual, update)?;
        tokio::task::yield_now().await;
        Ok(task)
    }

    /// Panicking form of [`TestStore::try_send`].
    #[track_caller]
    pub fn send<'a>(
        &'a mut self,
        action: A,
        update: impl FnMut(&mut S) + 'a,
    ) -> impl Future<Output = StoreTask> + 'a {
        let caller = std::panic::Location::caller();
        async move {
            match self.try_send(action, update).await {
                Ok(task) => task,
                Err(failure) => panic!("{failure}\n  at {caller}"),
            }
        }
    }

    /// Wait for an effect to feed back `expected` and assert the state it produced.
    pub async fn try_receive(
        &mut self,
        expected: A,
        update: impl FnMut(&mut S),
    ) -> Result<(), TestStoreFailure> {
        let description = format!("{expected:?}");
        self.receive_where(&description, |action| *action == expected, update)
            .await
    }

    /// Like [`TestStore::try_receive`] but matches the action with a predicate.
    pub async fn try_receive_matching(
        &mut self,
        matches: impl Fn(&A) -> bool,
        update: impl FnMut(&mut S),
    ) -> Result<(), TestStoreFailure> {
        self.receive_where("an action matching the predicate", matches, update)
            .await
    }

    #[track_caller]
    pub fn receive<'a>(
        &'a mut self,
        expected: A,
        update: impl FnMut(&mut S) + 'a,
    ) -> impl Future<Output = ()> + 'a {
        let caller = std::panic::Location::caller();
        async move {
            if let Err(failure) = self.try_receive(expected, update).await {
                panic!("{failure}\n  at {caller}");
            }
        }
    }

    #[track_caller]
    pub fn receive_matching<'a>(
        &'a mut self,
        matches: impl Fn(&A) -> bool + 'a,
        update: impl FnMut(&mut S) + 'a,
    ) -> impl Future<Output = ()> + 'a {
        let caller = std::panic::Location::caller();
        async move {
            if let Err(failure) = self.try_receive_matching(matches, update).await {
                panic!("{failure}\n  at {caller}");
            }
        }
    }

    /// Accept every action received so far without asserting it.
    pub fn skip_received_actions(&mut self) {
        let pending = self.drain_received();
        let show = matches!(
            self.exhaustivity,
            Exhaustivity::Off {
                show_skipped_assertions: true
            }
        );
        self.skip(pending, show);
    }

    /// Cancel every effect still running.
    pub fn skip_in_flight_effects(&mut self) {
        let origins = self.store.effects().origins();
        if !origins.is_empty() {
            tracing::debug!(?origins, "skipping in-flight effects");
        }
        self.store.effects().cancel_all();
    }

    /// Wait for every in-flight effect to finish.
    pub async fn try_finish(&mut self) -> Result<(), TestStoreFailure> {
        if tokio::time::timeout(self.timeout, self.store.settle())
            .await
            .is_ok()
        {
            return Ok(());
        }
        Err(TestStoreFailure::EffectsStillRunning {
            origins: self.store.effects().origins(),
        })
    }

    #[track_caller]
    pub fn finish(&mut self) -> impl Future<Output = ()> + '_ {
        let caller = std::panic::Location::caller();
        async move {
            if let Err(failure) = self.try_finish().await {
                panic!("{failure}\n  at {caller}");
            }
        }
    }

    /// Check that nothing is left to assert. Runs on drop if not called.
    pub fn assert_teardown(&mut self) -> Result<(), TestStoreFailure> {
        self.torn_down = true;
        let unreceived: Vec<String> = self
            .recorder
            .recorded
            .lock()
            .received
            .iter()
            .map(|(action, _)| format!("{action:?}"))
            .collect();
        let origins = self.store.effects().origins();

        if let Exhaustivity::Off { .. } = self.exhaustivity {
            if !unreceived.is_empty() {
                tracing::info!(actions = ?unreceived, "test store skipped received actions");
            }
            if !origins.is_empty() {
                tracing::info!(?origins, "test store skipped in-flight effects");
            }
            return Ok(());
        }

        if !unreceived.is_empty() {
            return Err(TestStoreFailure::UnreceivedActions {
                actions: unreceived,
            });
        }
        if !origins.is_empty() {
            return Err(TestStoreFailure::EffectsStillRunning { origins });
        }
        Ok(())
    }

    async fn receive_where(
        &mut self,
        description: &str,
        matches: impl Fn(&A) -> bool,
        update: impl FnMut(&mut S),
    ) -> Result<(), TestStoreFailure> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if !self.recorder.wait(deadline, |r| !r.received.is_empty()).await {
                return Err(TestStoreFailure::ReceiveTimeout {
                    expected: description.to_string(),
                    timeout: self.timeout,
                });
            }
            let Some((action, actual)) = self.recorder.recorded.lock().received.pop_front() else {
                continue;
            };

            if matches(&action) {
                let context = format!("receiving {action:?}");
                return self.assert_state(&context, actual, update);
            }

            match self.exhaustivity {
                Exhaustivity::On => {
                    let actual_text = format!("{action:?}");
                    let diff = diff::text_diff(
                        &format!("{description}\n"),
                        &format!("{actual_text}\n"),
                    );
                    self.recorder
                        .recorded
                        .lock()
                        .received
                        .push_front((action, actual));
                    return Err(TestStoreFailure::UnexpectedAction {
                        actual: actual_text,
                        diff,
                    });
                }
                Exhaustivity::Off {
                    show_skipped_assertions,
                } => self.skip(vec![(action, actual)], show_skipped_assertions),
            }
        }
    }

    fn assert_state(
        &mut self,
        context: &str,
        actual: S,
        mut update: impl FnMut(&mut S),
    ) -> Result<(), TestStoreFailure> {
        let result = match self.exhaustivity {
            Exhaustivity::On => {
                let mut expected = self.asserted.clone();
                update(&mut expected);
                Self::compare(context, &expected, &actual)
            }
            Exhaustivity::Off {
                show_skipped_assertions,
            } => {
                let mut expected = actual.clone();
                update(&mut expected);
                let result = Self::compare(context, &expected, &actual);
                if show_skipped_assertions && result.is_ok() {
                    let mut strict = self.asserted.clone();
                    update(&mut strict);
                    if strict != actual {
                        tracing::info!(
                            context,
                            "skipped state assertions:\n{}",
                            diff::debug_diff(&strict, &actual)
                        );
                    }
                }
                result
            }
        };
        self.asserted = actual;
        result
    }

    fn compare(context: &str, expected: &S, actual: &S) -> Result<(), TestStoreFailure> {
        if expected == actual {
            return Ok(());
        }
        Err(TestStoreFailure::StateMismatch {
            context: context.to_string(),
            diff: diff::debug_diff(expected, actual),
        })
    }

    fn drain_received(&mut self) -> Vec<(A, S)> {
        self.recorder.recorded.lock().received.drain(..).collect()
    }

    fn restore_received(&mut self, pending: Vec<(A, S)>) {
        let mut recorded = self.recorder.recorded.lock();
        for entry in pending.into_iter().rev() {
            recorded.received.push_front(entry);
        }
    }

    fn skip(&mut self, skipped: Vec<(A, S)>, show: bool) {
        for (action, state) in skipped {
            if show {
                tracing::info!(action = ?action, "skipped received action");
            }
            self.asserted = state;
        }
    }
}

impl<S, A> Drop for TestStore<S, A>
where
    S: State + Clone + PartialEq + Debug,
    A: Action + Clone + PartialEq,
{
    fn drop(&mut self) {
        if self.torn_down || std::thread::panicking() {
            return;
        }
        if let Err(failure) = self.assert_teardown() {
            panic!("{failure}");
        }
    }
}

use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::runtime::Handle;

use crate::dependencies::DependencyValues;
use crate::effect::{CancellationToken, Effect, Emitter, Operation};
use crate::misuse;
use crate::reducer::{Action, Reducer, State};

use super::runner::{self, report_stray_dismiss};
use super::{Shared, StoreCore, StoreTask};

struct Queue<A> {
    pending: VecDeque<Queued<A>>,
    draining: bool,
}

struct Queued<A> {
    action: A,
    /// Token of the effect that emitted the action, if any.
    source: Option<CancellationToken>,
}

/// Store that owns its state.
pub(crate) struct RootCore<S: State, A: Action> {
    state: Mutex<S>,
    reducer: Box<dyn Reducer<State = S, Action = A>>,
    queue: Mutex<Queue<A>>,
    shared: Arc<Shared>,
    dependencies: DependencyValues,
    runtime: Option<Handle>,
    log_actions: bool,
    this: Weak<RootCore<S, A>>,
}

impl<S: State, A: Action> RootCore<S, A> {
    pub(crate) fn new(
        state: S,
        reducer: Box<dyn Reducer<State = S, Action = A>>,
        dependencies: DependencyValues,
        runtime: Option<Handle>,
        log_actions: bool,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            state: Mutex::new(state),
            reducer,
            queue: Mutex::new(Queue {
                pending: VecDeque::new(),
                draining: false,
            }),
            shared: Arc::new(Shared::new()),
            dependencies,
            runtime,
            log_actions,
            this: this.clone(),
        })
    }

    fn drain(&self) -> StoreTask {
        let mut task = StoreTask::empty();
        scopeguard::defer_on_unwind! {
            let mut queue = self.queue.lock();
            queue.pending.clear();
            queue.draining = false;
        }
        loop {
            let Queued { action, source } = {
                let mut queue = self.queue.lock();
                match queue.pending.pop_front() {
                    Some(queued) => queued,
                    None => {
                        queue.draining = false;
                        break;
                    }
                }
            };
            self.dependencies.scope(|| {
                let effect = {
                    let mut state = self.state.lock();
                    // Checked under the state lock: a cancel that returned
                    // before this point always wins.
                    if source.as_ref().is_some_and(CancellationToken::is_cancelled) {
                        tracing::trace!(action = ?action, "dropping queued action of a cancelled effect");
                        return;
                    }
                    if self.log_actions {
                        tracing::debug!(action = ?action, "received action");
                    }
                    self.reducer.reduce(&mut state, &action)
                };
                if !effect.is_none() {
                    let origin = format!("{action:?}");
                    self.start(effect, &origin, &mut task);
                }
            });
        }
        self.shared.did_change();
        task
    }

    fn enqueue(&self, action: A) {
        self.queue.lock().pending.push_back(Queued {
            action,
            source: None,
        });
    }

    /// Queue `queued` and drain unless a drain is already running.
    fn submit(&self, queued: Queued<A>) -> StoreTask {
        {
            let mut queue = self.queue.lock();
            queue.pending.push_back(queued);
            if queue.draining {
                return StoreTask::empty();
            }
            queue.draining = true;
        }
        self.drain()
    }

    /// Start an effect returned by the reducer.
    ///
    /// Purely synchronous work (sends, cancellations) happens inline, in order;
    /// everything else gets its own task.
    fn start(&self, effect: Effect<A>, origin: &str, task: &mut StoreTask) {
        if effect.is_synchronous() {
            self.run_synchronously(effect);
            return;
        }
        match effect.operation {
            Operation::Merge(effects) => {
                for effect in effects {
                    self.start(effect, origin, task);
                }
            }
            operation => self.launch(Effect { operation }, origin, task),
        }
    }

    fn run_synchronously(&self, effect: Effect<A>) {
        match effect.operation {
            Operation::None => {}
            Operation::Send(action) => self.enqueue(action),
            Operation::Cancel(id) => {
                self.shared.effects.cancel(&id);
            }
            Operation::Cancellable {
                id,
                cancel_in_flight,
                effect,
            } => {
                if cancel_in_flight {
                    self.shared.effects.cancel(&id);
                }
                self.run_synchronously(*effect);
            }
            Operation::Merge(effects) | Operation::Concat(effects) => {
                for effect in effects {
                    self.run_synchronously(effect);
                }
            }
            Operation::Dismiss => report_stray_dismiss(),
            Operation::Run(_) | Operation::Stream(_) => {
                unreachable!("asynchronous effect classified as synchronous")
            }
        }
    }

    fn launch(&self, effect: Effect<A>, origin: &str, task: &mut StoreTask) {
        let Some(runtime) = self.runtime.as_ref() else {
            misuse::report(format_args!(
                "effect for {origin} was started by a store created outside a tokio runtime"
            ));
            return;
        };

        let token = CancellationToken::new();
        let registry = Arc::clone(&self.shared.effects);
        let effect_id = registry.begin(origin.to_owned(), token.clone());

        let this = self.this.clone();
        let emitter = Emitter::tagged(
            move |action, source: &CancellationToken| match this.upgrade() {
                Some(core) => {
                    core.submit(Queued {
                        action,
                        source: Some(source.clone()),
                    });
                }
                None => tracing::trace!("store dropped, discarding effect action"),
            },
            token.clone(),
        );
        let work = runner::prepare_task(effect, emitter, Arc::clone(&registry));

        let task_token = token.clone();
        let handle = runtime.spawn(self.dependencies.clone().scope_async(async move {
            let _end = scopeguard::guard(registry, move |registry| registry.end(effect_id));
            tokio::select! {
                _ = work => {}
                _ = task_token.cancelled() => {}
            }
        }));
        task.push(handle, token);
    }
}

impl<S: State, A: Action> StoreCore<S, A> for RootCore<S, A> {
    fn send(&self, action: A) -> StoreTask {
        self.submit(Queued {
            action,
            source: None,
        })
    }

    fn read(&self, reader: &mut dyn FnMut(&S)) {
        let state = self.state.lock();
        reader(&state);
    }

    fn shared(&self) -> &Arc<Shared> {
        &self.shared
    }
}

impl<S: State, A: Action> Drop for RootCore<S, A> {
    fn drop(&mut self) {
        self.shared.effects.cancel_all();
    }
}

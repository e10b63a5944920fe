//! Effects: values describing asynchronous work that may feed actions back
//! into the store.
//!
//! An effect is inert until the store starts it. Constructors cover the common
//! shapes (`none`, `send`, `run`, `stream`), combinators build larger effects
//! (`merge`, `concat`, `map`) and `cancellable`/`cancel` tie work to ids.

mod cancellation;
mod emitter;
mod id;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{BoxStream, Stream, StreamExt};
use futures::FutureExt;

use crate::identity::StateId;

pub use cancellation::CancellationToken;
pub use emitter::Emitter;
pub use id::{CancelId, CancelKey};

pub(crate) type RunFn<A> = Box<dyn FnOnce(Emitter<A>) -> BoxFuture<'static, ()> + Send>;

pub(crate) enum Operation<A> {
    None,
    Send(A),
    Run(RunFn<A>),
    Stream(BoxStream<'static, A>),
    Merge(Vec<Effect<A>>),
    Concat(Vec<Effect<A>>),
    Cancellable {
        id: CancelId,
        cancel_in_flight: bool,
        effect: Box<Effect<A>>,
    },
    Cancel(CancelId),
    /// Request that the enclosing presentation dismiss itself.
    Dismiss,
}

/// Description of asynchronous work returned by a reducer.
#[must_use = "effects do nothing unless returned to the store"]
pub struct Effect<A> {
    pub(crate) operation: Operation<A>,
}

impl<A> Effect<A> {
    fn from_operation(operation: Operation<A>) -> Self {
        Self { operation }
    }

    /// No work.
    pub fn none() -> Self {
        Self::from_operation(Operation::None)
    }

    /// Deliver `action` back to the store synchronously after the current action.
    pub fn send(action: A) -> Self {
        Self::from_operation(Operation::Send(action))
    }

    /// Cancel every in-flight effect registered under `key`.
    pub fn cancel<K: CancelKey>(key: K) -> Self {
        Self::from_operation(Operation::Cancel(CancelId::new(key)))
    }

    pub(crate) fn cancel_id(id: CancelId) -> Self {
        Self::from_operation(Operation::Cancel(id))
    }

    /// Ask the enclosing presentation or stack element to dismiss itself.
    pub fn dismiss() -> Self {
        Self::from_operation(Operation::Dismiss)
    }

    /// Run all effects concurrently.
    pub fn merge(effects: impl IntoIterator<Item = Effect<A>>) -> Self {
        let mut effects: Vec<_> = effects.into_iter().filter(|e| !e.is_none()).collect();
        match effects.len() {
            0 => Self::none(),
            1 => effects.pop().unwrap_or_else(Self::none),
            _ => Self::from_operation(Operation::Merge(effects)),
        }
    }

    /// Run effects one after another, each starting when the previous finished.
    pub fn concat(effects: impl IntoIterator<Item = Effect<A>>) -> Self {
        let mut effects: Vec<_> = effects.into_iter().filter(|e| !e.is_none()).collect();
        match effects.len() {
            0 => Self::none(),
            1 => effects.pop().unwrap_or_else(Self::none),
            _ => Self::from_operation(Operation::Concat(effects)),
        }
    }

    pub fn merge_with(self, other: Effect<A>) -> Self {
        Self::merge([self, other])
    }

    pub fn concat_with(self, other: Effect<A>) -> Self {
        Self::concat([self, other])
    }

    /// Register this effect under `key`. A later `Effect::cancel(key)` stops it.
    pub fn cancellable<K: CancelKey>(self, key: K) -> Self {
        self.wrap_cancellable(CancelId::new(key), false)
    }

    /// Like [`cancellable`](Self::cancellable), but first cancels whatever is
    /// already running under `key`.
    pub fn cancellable_in_flight<K: CancelKey>(self, key: K) -> Self {
        self.wrap_cancellable(CancelId::new(key), true)
    }

    fn wrap_cancellable(self, id: CancelId, cancel_in_flight: bool) -> Self {
        if self.is_none() && !cancel_in_flight {
            return self;
        }
        Self::from_operation(Operation::Cancellable {
            id,
            cancel_in_flight,
            effect: Box::new(self),
        })
    }

    pub fn is_none(&self) -> bool {
        matches!(self.operation, Operation::None)
    }

    /// Whether starting the effect needs no task: it only sends actions,
    /// cancels ids, or requests dismissal.
    pub(crate) fn is_synchronous(&self) -> bool {
        match &self.operation {
            Operation::None | Operation::Send(_) | Operation::Cancel(_) | Operation::Dismiss => {
                true
            }
            Operation::Merge(effects) | Operation::Concat(effects) => {
                effects.iter().all(Effect::is_synchronous)
            }
            Operation::Cancellable { effect, .. } => effect.is_synchronous(),
            Operation::Run(_) | Operation::Stream(_) => false,
        }
    }

    /// Prefix every cancellation id with `navigation` and register the whole
    /// effect under the navigation id itself.
    pub(crate) fn scoped(self, navigation: StateId) -> Self {
        if self.is_none() {
            return self;
        }
        Self::from_operation(Operation::Cancellable {
            id: CancelId::navigation(navigation),
            cancel_in_flight: false,
            effect: Box::new(self.prefix_ids(navigation)),
        })
    }

    fn prefix_ids(self, navigation: StateId) -> Self {
        let operation = match self.operation {
            Operation::Cancellable {
                id,
                cancel_in_flight,
                effect,
            } => Operation::Cancellable {
                id: id.within(navigation),
                cancel_in_flight,
                effect: Box::new(effect.prefix_ids(navigation)),
            },
            Operation::Cancel(id) => Operation::Cancel(id.within(navigation)),
            Operation::Merge(effects) => Operation::Merge(
                effects
                    .into_iter()
                    .map(|e| e.prefix_ids(navigation))
                    .collect(),
            ),
            Operation::Concat(effects) => Operation::Concat(
                effects
                    .into_iter()
                    .map(|e| e.prefix_ids(navigation))
                    .collect(),
            ),
            other => other,
        };
        Self::from_operation(operation)
    }
}

impl<A: Send + 'static> Effect<A> {
    /// Run an async operation that can emit any number of actions.
    pub fn run<F, Fut>(operation: F) -> Self
    where
        F: FnOnce(Emitter<A>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::from_operation(Operation::Run(Box::new(move |emitter| {
            operation(emitter).boxed()
        })))
    }

    /// Run a future and deliver its output, if any.
    pub fn future<Fut>(future: Fut) -> Self
    where
        Fut: Future<Output = Option<A>> + Send + 'static,
    {
        Self::run(move |emitter| async move {
            if let Some(action) = future.await {
                emitter.emit(action);
            }
        })
    }

    /// Deliver every element of `stream` as an action, in order.
    pub fn stream(stream: impl Stream<Item = A> + Send + 'static) -> Self {
        Self::from_operation(Operation::Stream(stream.boxed()))
    }

    /// Translate every action this effect produces.
    pub fn map<B: Send + 'static>(self, transform: impl Fn(A) -> B + Send + Sync + 'static) -> Effect<B> {
        self.map_arc(Arc::new(transform))
    }

    fn map_arc<B: Send + 'static>(self, transform: Arc<dyn Fn(A) -> B + Send + Sync>) -> Effect<B> {
        let operation = match self.operation {
            Operation::None => Operation::None,
            Operation::Send(action) => Operation::Send(transform(action)),
            Operation::Run(run) => Operation::Run(Box::new(move |emitter: Emitter<B>| {
                run(emitter.contramap(transform))
            })),
            Operation::Stream(stream) => {
                Operation::Stream(stream.map(move |action| transform(action)).boxed())
            }
            Operation::Merge(effects) => Operation::Merge(
                effects
                    .into_iter()
                    .map(|e| e.map_arc(Arc::clone(&transform)))
                    .collect(),
            ),
            Operation::Concat(effects) => Operation::Concat(
                effects
                    .into_iter()
                    .map(|e| e.map_arc(Arc::clone(&transform)))
                    .collect(),
            ),
            Operation::Cancellable {
                id,
                cancel_in_flight,
                effect,
            } => Operation::Cancellable {
                id,
                cancel_in_flight,
                effect: Box::new(effect.map_arc(transform)),
            },
            Operation::Cancel(id) => Operation::Cancel(id),
            Operation::Dismiss => Operation::Dismiss,
        };
        Effect::from_operation(operation)
    }

    /// Replace every dismissal request with the action `on_dismiss` produces.
    pub(crate) fn resolve_dismiss(self, on_dismiss: Arc<dyn Fn() -> A + Send + Sync>) -> Self {
        let operation = match self.operation {
            Operation::Dismiss => Operation::Send(on_dismiss()),
            Operation::Merge(effects) => Operation::Merge(
                effects
                    .into_iter()
                    .map(|e| e.resolve_dismiss(Arc::clone(&on_dismiss)))
                    .collect(),
            ),
            Operation::Concat(effects) => Operation::Concat(
                effects
                    .into_iter()
                    .map(|e| e.resolve_dismiss(Arc::clone(&on_dismiss)))
                    .collect(),
            ),
            Operation::Cancellable {
                id,
                cancel_in_flight,
                effect,
            } => Operation::Cancellable {
                id,
                cancel_in_flight,
                effect: Box::new(effect.resolve_dismiss(on_dismiss)),
            },
            other => other,
        };
        Self::from_operation(operation)
    }
}

impl<A> Default for Effect<A> {
    fn default() -> Self {
        Self::none()
    }
}

impl<A: fmt::Debug> fmt::Debug for Effect<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.operation {
            Operation::None => f.write_str("Effect::none"),
            Operation::Send(action) => f.debug_tuple("Effect::send").field(action).finish(),
            Operation::Run(_) => f.write_str("Effect::run"),
            Operation::Stream(_) => f.write_str("Effect::stream"),
            Operation::Merge(effects) => f.debug_tuple("Effect::merge").field(effects).finish(),
            Operation::Concat(effects) => f.debug_tuple("Effect::concat").field(effects).finish(),
            Operation::Cancellable {
                id,
                cancel_in_flight,
                effect,
            } => f
                .debug_struct("Effect::cancellable")
                .field("id", id)
                .field("cancel_in_flight", cancel_in_flight)
                .field("effect", effect)
                .finish(),
            Operation::Cancel(id) => f.debug_tuple("Effect::cancel").field(id).finish(),
            Operation::Dismiss => f.write_str("Effect::dismiss"),
        }
    }
}

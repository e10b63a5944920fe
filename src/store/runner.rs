//! Turns an effect tree into a future.
//!
//! Cancellation ids are registered while the future is built, not when it is
//! first polled, so a `cancel` processed before the task gets scheduled still
//! finds them.

use std::sync::Arc;

use futures::future::{self, BoxFuture};
use futures::{FutureExt, StreamExt};

use crate::effect::{CancelId, CancellationToken, Effect, Emitter, Operation};
use crate::misuse;

use super::effects::EffectRegistry;

/// Build the future for a task whose token is `emitter`'s.
///
/// A top-level cancellable shares the task token, so cancelling its id ends
/// the whole task.
pub(crate) fn prepare_task<A: Send + 'static>(
    effect: Effect<A>,
    emitter: Emitter<A>,
    registry: Arc<EffectRegistry>,
) -> BoxFuture<'static, ()> {
    match effect.operation {
        Operation::Cancellable {
            id,
            cancel_in_flight,
            effect,
        } => {
            let token = emitter.token().clone();
            cancellable(id, cancel_in_flight, token, *effect, emitter, registry)
        }
        operation => prepare(Effect { operation }, emitter, registry),
    }
}

fn prepare<A: Send + 'static>(
    effect: Effect<A>,
    emitter: Emitter<A>,
    registry: Arc<EffectRegistry>,
) -> BoxFuture<'static, ()> {
    match effect.operation {
        Operation::None => future::ready(()).boxed(),
        Operation::Send(action) => async move { emitter.emit(action) }.boxed(),
        Operation::Run(run) => run(emitter),
        Operation::Stream(mut stream) => async move {
            while let Some(action) = stream.next().await {
                if emitter.is_cancelled() {
                    break;
                }
                emitter.emit(action);
            }
        }
        .boxed(),
        Operation::Merge(effects) => {
            let work: Vec<_> = effects
                .into_iter()
                .map(|effect| prepare(effect, emitter.clone(), Arc::clone(&registry)))
                .collect();
            future::join_all(work).map(|_| ()).boxed()
        }
        Operation::Concat(effects) => async move {
            for effect in effects {
                if emitter.is_cancelled() {
                    break;
                }
                prepare(effect, emitter.clone(), Arc::clone(&registry)).await;
            }
        }
        .boxed(),
        Operation::Cancellable {
            id,
            cancel_in_flight,
            effect,
        } => {
            let token = emitter.token().child_token();
            cancellable(id, cancel_in_flight, token, *effect, emitter, registry)
        }
        Operation::Cancel(id) => {
            registry.cancel(&id);
            future::ready(()).boxed()
        }
        Operation::Dismiss => {
            report_stray_dismiss();
            future::ready(()).boxed()
        }
    }
}

fn cancellable<A: Send + 'static>(
    id: CancelId,
    cancel_in_flight: bool,
    token: CancellationToken,
    inner: Effect<A>,
    emitter: Emitter<A>,
    registry: Arc<EffectRegistry>,
) -> BoxFuture<'static, ()> {
    if cancel_in_flight {
        registry.cancel(&id);
    }
    let registration = registry.register(id.clone(), token.clone());
    let work = prepare(inner, emitter.with_token(token.clone()), Arc::clone(&registry));
    async move {
        let _registration = scopeguard::guard((), move |_| registry.unregister(&id, registration));
        tokio::select! {
            _ = work => {}
            _ = token.cancelled() => {}
        }
    }
    .boxed()
}

pub(crate) fn report_stray_dismiss() {
    misuse::report(
        "Effect::dismiss() was returned by a reducer that is not integrated as a \
         presented or stack child; there is nothing to dismiss",
    );
}

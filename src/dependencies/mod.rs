//! Scoped, overridable dependency handles.
//!
//! Reducers and effects read dependencies through [`dependency`]. The value
//! comes from the innermost active scope; stores capture the scope active when
//! they are built and re-enter it around every reducer call and effect task.

mod clock;
mod date;
mod uuid;

use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use thiserror::Error;

use crate::misuse;

pub use self::clock::{Clock, ClockKey, ImmediateClock, TokioClock};
pub use self::date::{DateGenerator, DateKey};
pub use self::uuid::{UuidGenerator, UuidKey};

/// Which default a dependency resolves to when nothing overrides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DependencyContext {
    #[default]
    Live,
    Test,
    Preview,
}

/// Key naming a dependency and its per-context defaults.
pub trait DependencyKey: 'static {
    type Value: Clone + Send + Sync + 'static;

    fn test_value() -> Self::Value;

    /// `None` means the dependency must be overridden in a live context.
    fn live_value() -> Option<Self::Value> {
        None
    }

    fn preview_value() -> Self::Value {
        Self::live_value().unwrap_or_else(Self::test_value)
    }
}

#[derive(Debug, Error)]
pub enum DependencyError {
    #[error(
        "dependency '{key}' has no live implementation; override it with \
         `with_dependencies` or `StoreBuilder::dependencies` before use"
    )]
    MissingLiveValue { key: &'static str },
}

/// Snapshot of dependency overrides plus the active context.
#[derive(Clone, Default)]
pub struct DependencyValues {
    context: DependencyContext,
    values: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

tokio::task_local! {
    static TASK_DEPENDENCIES: DependencyValues;
}

thread_local! {
    static THREAD_DEPENDENCIES: RefCell<Option<DependencyValues>> = const { RefCell::new(None) };
}

impl DependencyValues {
    pub fn new(context: DependencyContext) -> Self {
        Self {
            context,
            values: HashMap::new(),
        }
    }

    /// Values of the innermost active scope, or live defaults outside any scope.
    pub fn current() -> Self {
        if let Some(values) = THREAD_DEPENDENCIES.with(|cell| cell.borrow().clone()) {
            return values;
        }
        TASK_DEPENDENCIES
            .try_with(Clone::clone)
            .unwrap_or_default()
    }

    pub fn context(&self) -> DependencyContext {
        self.context
    }

    pub fn set_context(&mut self, context: DependencyContext) {
        self.context = context;
    }

    pub fn set<K: DependencyKey>(&mut self, value: K::Value) {
        self.values.insert(TypeId::of::<K>(), Arc::new(value));
    }

    pub fn remove<K: DependencyKey>(&mut self) {
        self.values.remove(&TypeId::of::<K>());
    }

    pub fn is_overridden<K: DependencyKey>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<K>())
    }

    /// Resolve `K`: override first, then the context's default.
    #[track_caller]
    pub fn get<K: DependencyKey>(&self) -> K::Value {
        if let Some(value) = self
            .values
            .get(&TypeId::of::<K>())
            .and_then(|value| value.downcast_ref::<K::Value>())
        {
            return value.clone();
        }
        match self.context {
            DependencyContext::Test => K::test_value(),
            DependencyContext::Preview => K::preview_value(),
            DependencyContext::Live => K::live_value().unwrap_or_else(|| {
                misuse::report(DependencyError::MissingLiveValue {
                    key: type_name::<K>(),
                });
                K::test_value()
            }),
        }
    }

    /// Run `operation` synchronously with `self` as the innermost scope.
    pub fn scope<R>(&self, operation: impl FnOnce() -> R) -> R {
        let previous = THREAD_DEPENDENCIES.with(|cell| cell.replace(Some(self.clone())));
        let _restore = scopeguard::guard(previous, |previous| {
            THREAD_DEPENDENCIES.with(|cell| *cell.borrow_mut() = previous);
        });
        operation()
    }

    /// Run `future` with `self` as the innermost scope for every poll.
    pub async fn scope_async<F: Future>(self, future: F) -> F::Output {
        TASK_DEPENDENCIES.scope(self, future).await
    }
}

impl fmt::Debug for DependencyValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyValues")
            .field("context", &self.context)
            .field("overrides", &self.values.len())
            .finish()
    }
}

/// Read a dependency from the innermost active scope.
#[track_caller]
pub fn dependency<K: DependencyKey>() -> K::Value {
    DependencyValues::current().get::<K>()
}

/// Run `operation` with the current dependencies modified by `update`.
pub fn with_dependencies<R>(
    update: impl FnOnce(&mut DependencyValues),
    operation: impl FnOnce() -> R,
) -> R {
    let mut values = DependencyValues::current();
    update(&mut values);
    values.scope(operation)
}

/// Async form of [`with_dependencies`].
pub async fn with_dependencies_async<F: Future>(
    update: impl FnOnce(&mut DependencyValues),
    future: F,
) -> F::Output {
    let mut values = DependencyValues::current();
    update(&mut values);
    values.scope_async(future).await
}

/// Run `operation` with a single dependency overridden.
pub fn with_dependency<K: DependencyKey, R>(value: K::Value, operation: impl FnOnce() -> R) -> R {
    with_dependencies(|values| values.set::<K>(value), operation)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Greeting;

    impl DependencyKey for Greeting {
        type Value = &'static str;

        fn test_value() -> Self::Value {
            "test"
        }

        fn live_value() -> Option<Self::Value> {
            Some("live")
        }
    }

    struct Unwired;

    impl DependencyKey for Unwired {
        type Value = u32;

        fn test_value() -> Self::Value {
            7
        }
    }

    #[test]
    fn context_selects_default() {
        assert_eq!(DependencyValues::new(DependencyContext::Live).get::<Greeting>(), "live");
        assert_eq!(DependencyValues::new(DependencyContext::Test).get::<Greeting>(), "test");
        assert_eq!(DependencyValues::new(DependencyContext::Preview).get::<Greeting>(), "live");
    }

    #[test]
    fn override_wins_over_context() {
        let mut values = DependencyValues::new(DependencyContext::Test);
        values.set::<Greeting>("override");
        assert_eq!(values.get::<Greeting>(), "override");
        values.remove::<Greeting>();
        assert_eq!(values.get::<Greeting>(), "test");
    }

    #[test]
    fn nested_scopes_restore() {
        with_dependency::<Greeting, _>("outer", || {
            assert_eq!(dependency::<Greeting>(), "outer");
            with_dependency::<Greeting, _>("inner", || {
                assert_eq!(dependency::<Greeting>(), "inner");
            });
            assert_eq!(dependency::<Greeting>(), "outer");
        });
        assert_eq!(dependency::<Greeting>(), "live");
    }

    #[test]
    fn test_context_needs_no_live_value() {
        let values = DependencyValues::new(DependencyContext::Test);
        assert_eq!(values.scope(dependency::<Unwired>), 7);
    }

    #[test]
    #[should_panic(expected = "has no live implementation")]
    fn missing_live_value_is_misuse() {
        crate::misuse::set_policy(crate::misuse::MisusePolicy::Panic);
        DependencyValues::new(DependencyContext::Live).get::<Unwired>();
    }

    #[tokio::test]
    async fn async_scope_spans_awaits() {
        let value = with_dependencies_async(
            |values| values.set::<Greeting>("task"),
            async {
                tokio::task::yield_now().await;
                dependency::<Greeting>()
            },
        )
        .await;
        assert_eq!(value, "task");
    }
}

mod common;

use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use statecraft::dependencies::{
    dependency, with_dependencies_async, with_dependency, DateGenerator, DateKey,
    DependencyContext, DependencyKey, UuidGenerator, UuidKey,
};
use statecraft::misuse::{self, MisusePolicy};
use statecraft::{Effect, Reduce, Reducer, Store};
use uuid::Uuid;

use common::within_second;

#[derive(Debug, Clone, Default, PartialEq)]
struct Log {
    ids: Vec<Uuid>,
    dates: Vec<SystemTime>,
    codes: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
enum LogAction {
    GenerateId,
    StampLater,
    Stamped(SystemTime),
    ReadCode,
}

/// No live implementation: must be overridden outside tests.
struct AccessCode;

impl DependencyKey for AccessCode {
    type Value = u32;

    fn test_value() -> Self::Value {
        1234
    }
}

fn log_reducer() -> impl Reducer<State = Log, Action = LogAction> {
    Reduce::new(|log: &mut Log, action: &LogAction| match action {
        LogAction::GenerateId => {
            log.ids.push(dependency::<UuidKey>().generate());
            Effect::none()
        }
        LogAction::StampLater => Effect::future(async {
            tokio::task::yield_now().await;
            Some(LogAction::Stamped(dependency::<DateKey>().now()))
        }),
        LogAction::Stamped(date) => {
            log.dates.push(*date);
            Effect::none()
        }
        LogAction::ReadCode => {
            log.codes.push(dependency::<AccessCode>());
            Effect::none()
        }
    })
}

#[tokio::test]
async fn store_keeps_the_dependencies_it_was_built_in() {
    let store = with_dependency::<UuidKey, _>(UuidGenerator::incrementing(), || {
        Store::new(Log::default(), log_reducer())
    });

    store.send(LogAction::GenerateId);
    store.send(LogAction::GenerateId);

    assert_eq!(store.state().ids, vec![Uuid::from_u128(0), Uuid::from_u128(1)]);
}

#[tokio::test]
async fn builder_overrides_win_over_the_ambient_scope() {
    let ambient = Uuid::from_u128(1);
    let explicit = Uuid::from_u128(2);
    let store = with_dependency::<UuidKey, _>(UuidGenerator::constant(ambient), || {
        Store::builder(Log::default(), log_reducer())
            .dependencies(|values| values.set::<UuidKey>(UuidGenerator::constant(explicit)))
            .build()
    });

    store.send(LogAction::GenerateId);

    assert_eq!(store.state().ids, vec![explicit]);
}

#[tokio::test]
async fn effects_run_with_the_store_dependencies() {
    let store = Store::builder(Log::default(), log_reducer())
        .dependencies(|values| values.set::<DateKey>(DateGenerator::since_epoch(86_400)))
        .build();

    let task = store.send(LogAction::StampLater);
    within_second(task.finish()).await;

    assert_eq!(store.state().dates, vec![UNIX_EPOCH + Duration::from_secs(86_400)]);
}

#[tokio::test]
async fn async_scope_spans_awaits() {
    let date = with_dependencies_async(
        |values| values.set::<DateKey>(DateGenerator::since_epoch(60)),
        async {
            tokio::task::yield_now().await;
            dependency::<DateKey>().now()
        },
    )
    .await;

    assert_eq!(date, UNIX_EPOCH + Duration::from_secs(60));
}

#[test]
fn scope_is_restored_after_a_panic() {
    let outer = Uuid::from_u128(10);
    with_dependency::<UuidKey, _>(UuidGenerator::constant(outer), || {
        let result = panic::catch_unwind(|| {
            with_dependency::<UuidKey, _>(UuidGenerator::constant(Uuid::nil()), || {
                panic!("boom");
            })
        });
        assert!(result.is_err());
        assert_eq!(dependency::<UuidKey>().generate(), outer);
    });
}

#[test]
fn test_context_uses_test_values() {
    let store = Store::builder(Log::default(), log_reducer())
        .dependencies(|values| values.set_context(DependencyContext::Test))
        .build();

    store.send(LogAction::ReadCode);

    assert_eq!(store.state().codes, vec![1234]);
}

#[test]
fn missing_live_value_is_reported_as_misuse() {
    misuse::set_policy(MisusePolicy::Panic);
    let store = Store::new(Log::default(), log_reducer());

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        store.send(LogAction::ReadCode);
    }));

    assert!(result.is_err());
    assert!(store.state().codes.is_empty());
}

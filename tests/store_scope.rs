mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use statecraft::dependencies::{ClockKey, ImmediateClock};
use statecraft::store::StoreObserver;
use statecraft::{Effect, Reduce, Reducer, ReducerExt, Scope, Store};

use common::{within_second, CounterAction, CounterReducer, CounterState, TimerId};

#[derive(Debug, Clone, PartialEq)]
enum Screen {
    Counter(CounterState),
    Settings,
}

#[derive(Debug, Clone, PartialEq)]
struct AppState {
    screen: Screen,
    selections: usize,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            screen: Screen::Counter(CounterState::default()),
            selections: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum AppAction {
    Counter(CounterAction),
    DoubleDecrement,
    ShowSettings,
}

fn app_reducer() -> impl Reducer<State = AppState, Action = AppAction> {
    Scope::new(
        |state: &mut AppState| match &mut state.screen {
            Screen::Counter(counter) => Some(counter),
            Screen::Settings => None,
        },
        |action: &AppAction| match action {
            AppAction::Counter(action) => Some(action),
            _ => None,
        },
        AppAction::Counter,
        CounterReducer,
    )
    .combine(Reduce::new(|state: &mut AppState, action: &AppAction| {
        match action {
            AppAction::Counter(_) => Effect::none(),
            AppAction::DoubleDecrement => Effect::merge([
                Effect::send(AppAction::Counter(CounterAction::Decrement)),
                Effect::send(AppAction::Counter(CounterAction::Decrement)),
            ]),
            AppAction::ShowSettings => {
                state.screen = Screen::Settings;
                state.selections += 1;
                Effect::none()
            }
        }
    }))
}

fn app_store() -> Store<AppState, AppAction> {
    Store::builder(AppState::default(), app_reducer())
        .dependencies(|values| values.set::<ClockKey>(Arc::new(ImmediateClock::new())))
        .build()
}

fn counter(state: &AppState) -> Option<CounterState> {
    match &state.screen {
        Screen::Counter(counter) => Some(counter.clone()),
        Screen::Settings => None,
    }
}

struct CountingObserver {
    calls: Arc<AtomicUsize>,
}

impl StoreObserver for CountingObserver {
    fn state_did_change(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn scoped_store_reads_and_sends_through_the_parent() {
    let store = app_store();
    let selections = store.scope(|state: &AppState| state.selections, |action| action);
    let counter_store = store
        .scope_optional(counter, AppAction::Counter)
        .expect("counter screen is showing");

    counter_store.send(CounterAction::Increment);
    counter_store.send(CounterAction::Increment);

    assert_eq!(counter_store.state().count, 2);
    assert_eq!(counter(&store.state()).map(|c| c.count), Some(2));
    assert_eq!(selections.state(), 0);
}

#[tokio::test]
async fn optional_scope_keeps_its_last_value_once_the_case_changes() {
    let store = app_store();
    let counter_store = store
        .scope_optional(counter, AppAction::Counter)
        .expect("counter screen is showing");
    counter_store.send(CounterAction::Increment);

    store.send(AppAction::ShowSettings);
    counter_store.send(CounterAction::Increment);

    assert_eq!(counter_store.state().count, 1);
    assert_eq!(store.state().screen, Screen::Settings);
    assert!(store.scope_optional(counter, AppAction::Counter).is_none());
}

#[tokio::test]
async fn scoped_stores_share_the_effect_registry() {
    let store = app_store();
    let counter_store = store
        .scope_optional(counter, AppAction::Counter)
        .expect("counter screen is showing");

    counter_store.send(CounterAction::StartTimer);
    assert_eq!(store.in_flight_count(), 1);
    within_second(store.wait_for(|state| counter(state).map_or(false, |c| c.count >= 2))).await;

    assert_eq!(counter_store.cancel(TimerId), 1);
    within_second(store.settle()).await;
    assert_eq!(counter_store.in_flight_count(), 0);
}

#[tokio::test]
async fn observers_are_notified_once_per_send() {
    let store = app_store();
    let calls = Arc::new(AtomicUsize::new(0));
    let observer: Arc<dyn StoreObserver> = Arc::new(CountingObserver {
        calls: Arc::clone(&calls),
    });
    store.observe(Arc::downgrade(&observer));

    store.send(AppAction::Counter(CounterAction::Increment));
    store.send(AppAction::DoubleDecrement);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(counter(&store.state()).map(|c| c.count), Some(-1));

    drop(observer);
    store.send(AppAction::Counter(CounterAction::Increment));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn subscription_version_counts_processed_batches() {
    let store = app_store();
    let subscription = store.subscribe();
    let start = subscription.version();

    store.send(AppAction::DoubleDecrement);
    store.send(AppAction::ShowSettings);

    assert_eq!(subscription.version(), start + 2);
}

#[tokio::test]
async fn wait_for_resolves_when_an_effect_lands() {
    let store = app_store();

    // Already true: resolves without any change.
    within_second(store.wait_for(|state| state.selections == 0)).await;

    store.send(AppAction::Counter(CounterAction::FactButtonTapped));
    within_second(store.wait_for(|state| {
        counter(state).map_or(false, |c| c.fact.is_some())
    }))
    .await;
    assert_eq!(
        counter(&store.state()).and_then(|c| c.fact),
        Some("0 is a good number".to_string())
    );
}

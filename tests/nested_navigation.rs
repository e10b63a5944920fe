//! A sheet presented from inside a stack element.

mod common;

use std::sync::Arc;

use statecraft::dependencies::{ClockKey, ImmediateClock};
use statecraft::store::{DismissReason, LifecycleEvent};
use statecraft::{
    Effect, PresentationAction, PresentationState, PresentationStore, Reduce, Reducer,
    ReducerExt, StackAction, StackElementId, StackState, StackStore, Store,
};

use common::{within_second, yield_many, CounterAction, CounterReducer, CounterState, TimerId};

#[derive(Debug, Clone, Default, PartialEq)]
struct ScreenState {
    sheet: PresentationState<CounterState>,
}

#[derive(Debug, Clone, PartialEq)]
enum ScreenAction {
    OpenSheet,
    Sheet(PresentationAction<CounterAction>),
}

#[derive(Debug, Clone, Default, PartialEq)]
struct RootState {
    path: StackState<ScreenState>,
}

#[derive(Debug, Clone, PartialEq)]
enum RootAction {
    PushScreen,
    /// Clears every sheet from the root, bypassing the screens' own reducers.
    ClearSheets,
    Path(StackAction<ScreenState, ScreenAction>),
}

fn screen_reducer() -> impl Reducer<State = ScreenState, Action = ScreenAction> {
    Reduce::new(|state: &mut ScreenState, action: &ScreenAction| {
        if let ScreenAction::OpenSheet = action {
            state.sheet.present(CounterState::default());
        }
        Effect::none()
    })
    .if_let(
        |state| &mut state.sheet,
        |action| match action {
            ScreenAction::Sheet(action) => Some(action),
            _ => None,
        },
        ScreenAction::Sheet,
        CounterReducer,
    )
}

fn root_reducer() -> impl Reducer<State = RootState, Action = RootAction> {
    Reduce::new(|state: &mut RootState, action: &RootAction| {
        match action {
            RootAction::PushScreen => {
                state.path.push(ScreenState::default());
            }
            RootAction::ClearSheets => {
                for (_, screen) in state.path.iter_mut() {
                    screen.sheet.dismiss();
                }
            }
            RootAction::Path(_) => {}
        }
        Effect::none()
    })
    .for_each(
        |state| &mut state.path,
        |action| match action {
            RootAction::Path(action) => Some(action),
            _ => None,
        },
        RootAction::Path,
        screen_reducer(),
    )
}

fn new_store() -> Store<RootState, RootAction> {
    Store::builder(RootState::default(), root_reducer())
        .dependencies(|values| values.set::<ClockKey>(Arc::new(ImmediateClock::new())))
        .build()
}

fn sheet_count(state: &RootState) -> Option<i64> {
    state
        .path
        .first()
        .and_then(|screen| screen.sheet.as_ref())
        .map(|counter| counter.count)
}

#[tokio::test]
async fn clearing_a_nested_sheet_cancels_its_effects() {
    let store = new_store();
    let screens = StackStore::new(&store, |state| &state.path, RootAction::Path);
    store.send(RootAction::PushScreen);
    let screen = screens.store(StackElementId::new(0)).expect("pushed");
    screen.send(ScreenAction::OpenSheet);
    let sheet = PresentationStore::new(&screen, |state| &state.sheet, ScreenAction::Sheet);
    let counter = sheet.store().expect("presented");
    let id = sheet.id().expect("presented");

    counter.send(CounterAction::StartTimer);
    within_second(store.wait_for(|state| sheet_count(state).map_or(false, |count| count >= 2)))
        .await;
    assert_eq!(store.in_flight_count(), 1);

    store.send(RootAction::ClearSheets);

    within_second(store.settle()).await;
    assert_eq!(store.in_flight_count(), 0);
    assert_eq!(
        sheet.events(),
        vec![
            LifecycleEvent::Created(id),
            LifecycleEvent::Dismissed {
                id,
                reason: DismissReason::StateCleared,
            },
            LifecycleEvent::Destroyed(id),
        ]
    );
    assert!(counter.is_invalidated());
    assert!(!screen.is_invalidated());

    // The screen itself keeps working.
    screen.send(ScreenAction::OpenSheet);
    assert!(sheet.store().is_some());
    yield_many(10).await;
    assert_eq!(sheet_count(&store.state()), Some(0));
}

#[tokio::test]
async fn nested_child_store_cancels_inside_its_own_scope() {
    let store = new_store();
    let screens = StackStore::new(&store, |state| &state.path, RootAction::Path);
    store.send(RootAction::PushScreen);
    let screen = screens.store(StackElementId::new(0)).expect("pushed");
    screen.send(ScreenAction::OpenSheet);
    let sheet = PresentationStore::new(&screen, |state| &state.sheet, ScreenAction::Sheet);
    let counter = sheet.store().expect("presented");

    counter.send(CounterAction::StartTimer);

    assert_eq!(store.cancel(TimerId), 0);
    assert_eq!(counter.cancel(TimerId), 1);
    within_second(store.settle()).await;
    assert_eq!(store.in_flight_count(), 0);
}

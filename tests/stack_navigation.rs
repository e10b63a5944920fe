mod common;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use statecraft::dependencies::{ClockKey, ImmediateClock};
use statecraft::misuse::{self, MisusePolicy};
use statecraft::store::{DismissReason, LifecycleEvent};
use statecraft::{StackAction, StackElementId, StackStore, StateId, Store};

use common::{
    element, path_reducer, within_second, CounterAction, CounterState, PathAction, PathState,
};

fn path_store() -> Store<PathState, PathAction> {
    Store::builder(PathState::default(), path_reducer())
        .dependencies(|values| values.set::<ClockKey>(Arc::new(ImmediateClock::new())))
        .build()
}

fn ids(raw: &[u64]) -> Vec<StackElementId> {
    raw.iter().copied().map(StackElementId::new).collect()
}

fn two_children(events: &[LifecycleEvent]) -> (StateId, StateId) {
    let created: Vec<StateId> = events
        .iter()
        .filter_map(|event| match event {
            LifecycleEvent::Created(id) => Some(*id),
            _ => None,
        })
        .collect();
    match created.as_slice() {
        [bottom, top] => (*bottom, *top),
        other => panic!("expected two child stores, got {other:?}"),
    }
}

#[test]
fn element_action_for_missing_id_is_a_no_op() {
    let store = Store::new(PathState::default(), path_reducer());
    store.send(PathAction::PushCounter);

    store.send(element(7, CounterAction::Increment));

    assert_eq!(store.state().path.get(StackElementId::new(0)), Some(&CounterState::default()));
    assert!(store.state().pops.is_empty());
}

#[test]
fn pop_from_missing_id_is_a_no_op() {
    let store = Store::new(PathState::default(), path_reducer());
    store.send(PathAction::PushCounter);

    store.send(PathAction::Path(StackAction::PopFrom {
        id: StackElementId::new(3),
    }));

    assert_eq!(store.state().path.len(), 1);
    assert!(store.state().pops.is_empty());
}

#[test]
fn pop_from_removes_the_element_and_everything_above() {
    let store = Store::new(PathState::default(), path_reducer());
    for _ in 0..3 {
        store.send(PathAction::PushCounter);
    }

    store.send(PathAction::Path(StackAction::PopFrom {
        id: StackElementId::new(1),
    }));

    assert_eq!(store.state().path.ids(), ids(&[0]));
    assert_eq!(store.state().pops, ids(&[1]));
}

#[test]
fn push_action_uses_the_given_id() {
    let store = Store::new(PathState::default(), path_reducer());

    store.send(PathAction::Path(StackAction::Push {
        id: StackElementId::new(10),
        state: CounterState {
            count: 5,
            ..CounterState::default()
        },
    }));
    store.send(PathAction::PushCounter);

    assert_eq!(store.state().path.ids(), ids(&[10, 11]));
    assert_eq!(store.state().path.first().map(|c| c.count), Some(5));
}

#[test]
fn duplicate_push_id_is_reported_as_misuse() {
    misuse::set_policy(MisusePolicy::Panic);
    let store = Store::new(PathState::default(), path_reducer());
    store.send(PathAction::PushCounter);

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        store.send(PathAction::Path(StackAction::Push {
            id: StackElementId::new(0),
            state: CounterState::default(),
        }));
    }));

    assert!(result.is_err());
    assert_eq!(store.state().path.len(), 1);
    // The store keeps working after the failed send.
    store.send(element(0, CounterAction::Increment));
    assert_eq!(store.state().path.first().map(|c| c.count), Some(1));
}

#[test]
fn popped_id_cannot_be_pushed_again() {
    misuse::set_policy(MisusePolicy::Panic);
    let store = Store::new(PathState::default(), path_reducer());
    store.send(PathAction::PushCounter);
    store.send(PathAction::Path(StackAction::PopFrom {
        id: StackElementId::new(0),
    }));

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        store.send(PathAction::Path(StackAction::Push {
            id: StackElementId::new(0),
            state: CounterState::default(),
        }));
    }));
    assert!(result.is_err());
    assert!(store.state().path.is_empty());

    // A late action for the popped element finds nothing.
    store.send(element(0, CounterAction::Increment));
    assert!(store.state().path.is_empty());

    store.send(PathAction::PushCounter);
    assert_eq!(store.state().path.ids(), ids(&[1]));
    store.send(element(0, CounterAction::Increment));
    assert_eq!(store.state().path.first().map(|c| c.count), Some(0));
}

#[test]
fn child_dismiss_pops_its_element() {
    let store = Store::new(PathState::default(), path_reducer());
    store.send(PathAction::PushCounter);
    store.send(PathAction::PushCounter);

    store.send(element(1, CounterAction::Close));

    assert_eq!(store.state().path.ids(), ids(&[0]));
    assert_eq!(store.state().pops, ids(&[1]));
}

#[tokio::test]
async fn popping_cancels_the_element_effects() {
    let store = path_store();
    store.send(PathAction::PushCounter);
    store.send(PathAction::PushCounter);

    store.send(element(1, CounterAction::StartTimer));
    within_second(store.wait_for(|state| {
        state
            .path
            .get(StackElementId::new(1))
            .map_or(false, |counter| counter.count >= 2)
    }))
    .await;
    store.send(PathAction::Path(StackAction::PopFrom {
        id: StackElementId::new(1),
    }));

    assert_eq!(store.in_flight_count(), 0);
    within_second(store.settle()).await;
}

#[tokio::test]
async fn element_effects_survive_other_elements_popping() {
    let store = path_store();
    store.send(PathAction::PushCounter);
    store.send(PathAction::PushCounter);
    store.send(PathAction::PushCounter);

    store.send(element(0, CounterAction::StartTimer));
    store.send(PathAction::Path(StackAction::PopFrom {
        id: StackElementId::new(1),
    }));
    assert_eq!(store.in_flight_count(), 1);

    within_second(store.wait_for(|state| {
        state.path.first().map_or(false, |counter| counter.count >= 3)
    }))
    .await;
    store.send(element(0, CounterAction::StopTimer));
    within_second(store.settle()).await;
}

#[tokio::test]
async fn stack_store_follows_the_elements() {
    let store = path_store();
    let screens = StackStore::new(&store, |state| &state.path, PathAction::Path);
    assert!(screens.stores().is_empty());

    store.send(PathAction::PushCounter);
    store.send(PathAction::PushCounter);
    let stores = screens.stores();
    assert_eq!(
        stores.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
        ids(&[0, 1])
    );

    let top = screens.store(StackElementId::new(1)).expect("pushed");
    top.send(CounterAction::Increment);
    assert_eq!(top.state().count, 1);
    assert_eq!(store.state().path.get(StackElementId::new(1)).map(|c| c.count), Some(1));
    assert_eq!(screens.live_count(), 2);
}

#[tokio::test]
async fn stack_store_pop_records_explicit_dismissals() {
    let store = path_store();
    let screens = StackStore::new(&store, |state| &state.path, PathAction::Path);
    store.send(PathAction::PushCounter);
    store.send(PathAction::PushCounter);
    let top = screens.store(StackElementId::new(1)).expect("pushed");
    let (bottom_id, top_id) = two_children(&screens.events());

    screens.pop_from(StackElementId::new(0));

    assert_eq!(store.state().pops, ids(&[0]));
    assert!(store.state().path.is_empty());
    assert_eq!(
        screens.events()[2..],
        [
            LifecycleEvent::Dismissed {
                id: bottom_id,
                reason: DismissReason::Explicit,
            },
            LifecycleEvent::Dismissed {
                id: top_id,
                reason: DismissReason::Explicit,
            },
            LifecycleEvent::Destroyed(bottom_id),
            LifecycleEvent::Destroyed(top_id),
        ]
    );
    assert_eq!(screens.live_count(), 0);
    assert!(top.is_invalidated());
    assert!(!screens.pop_from(StackElementId::new(0)).has_effects());
}

#[tokio::test]
async fn stack_store_sees_parent_driven_pops_as_state_cleared() {
    let store = path_store();
    let screens = StackStore::new(&store, |state| &state.path, PathAction::Path);
    store.send(PathAction::PushCounter);
    store.send(PathAction::PushCounter);
    let (_, top_id) = two_children(&screens.events());

    store.send(element(1, CounterAction::Close));

    assert_eq!(
        screens.events()[2..],
        [
            LifecycleEvent::Dismissed {
                id: top_id,
                reason: DismissReason::StateCleared,
            },
            LifecycleEvent::Destroyed(top_id),
        ]
    );
    assert_eq!(screens.stores().len(), 1);
}

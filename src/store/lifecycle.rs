//! Child stores that follow the identity of presented and stacked state.
//!
//! A child store exists exactly as long as the identity it was created for is
//! present in the parent. When that identity leaves, the child store is told
//! why, then invalidated, its effects are cancelled and the teardown is
//! recorded.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::effect::CancelId;
use crate::identity::StateId;
use crate::navigation::{
    PresentationAction, PresentationState, StackAction, StackElementId, StackState,
};
use crate::reducer::{Action, State};

use super::{Store, StoreObserver, StoreTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    /// Dismissed through the child store handle.
    Explicit,
    /// The parent cleared or replaced the child state.
    StateCleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Created(StateId),
    Dismissed { id: StateId, reason: DismissReason },
    Destroyed(StateId),
}

#[derive(Default)]
struct EventLog {
    events: Mutex<Vec<LifecycleEvent>>,
}

impl EventLog {
    fn record(&self, event: LifecycleEvent) {
        tracing::debug!(?event, "child store lifecycle");
        self.events.lock().push(event);
    }

    fn snapshot(&self) -> Vec<LifecycleEvent> {
        self.events.lock().clone()
    }

    fn live_count(&self) -> usize {
        self.events.lock().iter().fold(0usize, |live, event| match event {
            LifecycleEvent::Created(_) => live + 1,
            LifecycleEvent::Destroyed(_) => live.saturating_sub(1),
            LifecycleEvent::Dismissed { .. } => live,
        })
    }
}

struct Child<C, CA> {
    id: StateId,
    store: Store<C, CA>,
    dismissing: bool,
}

fn tear_down<P: State, PA: Action, C, CA>(
    parent: &Store<P, PA>,
    events: &EventLog,
    child: Child<C, CA>,
) where
    C: Clone + Send + 'static,
    CA: Action,
{
    let reason = if child.dismissing {
        DismissReason::Explicit
    } else {
        events.record(LifecycleEvent::Dismissed {
            id: child.id,
            reason: DismissReason::StateCleared,
        });
        DismissReason::StateCleared
    };
    child.store.notify_dismissed(reason);
    child.store.invalidate();
    // Registered by the reducer inside every navigation scope around `parent`.
    parent
        .effects()
        .cancel(&parent.scoped_id(CancelId::navigation(child.id)));
    events.record(LifecycleEvent::Destroyed(child.id));
}

/// Child store for a [`PresentationState`] slot.
pub struct PresentationStore<P: State, PA: Action, C, CA> {
    inner: Arc<PresentationInner<P, PA, C, CA>>,
}

struct PresentationInner<P: State, PA: Action, C, CA> {
    parent: Store<P, PA>,
    to_state: fn(&P) -> &PresentationState<C>,
    from_action: fn(PresentationAction<CA>) -> PA,
    current: Mutex<Option<Child<C, CA>>>,
    events: EventLog,
}

impl<P, PA, C, CA> PresentationStore<P, PA, C, CA>
where
    P: State,
    PA: Action,
    C: Clone + Send + 'static,
    CA: Action,
{
    pub fn new(
        parent: &Store<P, PA>,
        to_state: fn(&P) -> &PresentationState<C>,
        from_action: fn(PresentationAction<CA>) -> PA,
    ) -> Self {
        let inner = Arc::new(PresentationInner {
            parent: parent.clone(),
            to_state,
            from_action,
            current: Mutex::new(None),
            events: EventLog::default(),
        });
        inner.sync();
        let observer: Arc<dyn StoreObserver> = inner.clone();
        parent.observe(Arc::downgrade(&observer));
        Self { inner }
    }

    /// Store for the current presentation, if any.
    pub fn store(&self) -> Option<Store<C, CA>> {
        self.inner.current.lock().as_ref().map(|c| c.store.clone())
    }

    pub fn id(&self) -> Option<StateId> {
        self.inner.current.lock().as_ref().map(|c| c.id)
    }

    /// Ask the parent to dismiss the current presentation.
    pub fn dismiss(&self) -> StoreTask {
        {
            let mut current = self.inner.current.lock();
            let Some(child) = current.as_mut() else {
                return StoreTask::empty();
            };
            if !child.dismissing {
                child.dismissing = true;
                self.inner.events.record(LifecycleEvent::Dismissed {
                    id: child.id,
                    reason: DismissReason::Explicit,
                });
            }
        }
        self.inner
            .parent
            .send((self.inner.from_action)(PresentationAction::Dismiss))
    }

    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.inner.events.snapshot()
    }

    /// Child stores created and not yet destroyed.
    pub fn live_count(&self) -> usize {
        self.inner.events.live_count()
    }
}

impl<P, PA, C, CA> PresentationInner<P, PA, C, CA>
where
    P: State,
    PA: Action,
    C: Clone + Send + 'static,
    CA: Action,
{
    fn sync(&self) {
        let to_state = self.to_state;
        let presented = self.parent.with_state(|parent| to_state(parent).id());
        let mut current = self.current.lock();
        if current.as_ref().map(|c| c.id) == presented {
            return;
        }
        if let Some(old) = current.take() {
            tear_down(&self.parent, &self.events, old);
        }
        let Some(id) = presented else {
            return;
        };
        let from_action = self.from_action;
        let store = self.parent.scope_navigation(
            id,
            move |parent: &P| {
                let slot = to_state(parent);
                if slot.id() == Some(id) {
                    slot.as_ref().cloned()
                } else {
                    None
                }
            },
            move |action| from_action(PresentationAction::Presented(action)),
        );
        if let Some(store) = store {
            self.events.record(LifecycleEvent::Created(id));
            *current = Some(Child {
                id,
                store,
                dismissing: false,
            });
        }
    }
}

impl<P, PA, C, CA> StoreObserver for PresentationInner<P, PA, C, CA>
where
    P: State,
    PA: Action,
    C: Clone + Send + 'static,
    CA: Action,
{
    fn state_did_change(&self) {
        self.sync();
    }
}

/// Child stores for every element of a [`StackState`].
pub struct StackStore<P: State, PA: Action, C, CA> {
    inner: Arc<StackInner<P, PA, C, CA>>,
}

struct StackInner<P: State, PA: Action, C, CA> {
    parent: Store<P, PA>,
    to_state: fn(&P) -> &StackState<C>,
    from_action: fn(StackAction<C, CA>) -> PA,
    children: Mutex<Vec<(StackElementId, Child<C, CA>)>>,
    events: EventLog,
}

impl<P, PA, C, CA> StackStore<P, PA, C, CA>
where
    P: State,
    PA: Action,
    C: Clone + Send + 'static,
    CA: Action,
{
    pub fn new(
        parent: &Store<P, PA>,
        to_state: fn(&P) -> &StackState<C>,
        from_action: fn(StackAction<C, CA>) -> PA,
    ) -> Self {
        let inner = Arc::new(StackInner {
            parent: parent.clone(),
            to_state,
            from_action,
            children: Mutex::new(Vec::new()),
            events: EventLog::default(),
        });
        inner.sync();
        let observer: Arc<dyn StoreObserver> = inner.clone();
        parent.observe(Arc::downgrade(&observer));
        Self { inner }
    }

    /// Stores for every element, bottom to top.
    pub fn stores(&self) -> Vec<(StackElementId, Store<C, CA>)> {
        self.inner
            .children
            .lock()
            .iter()
            .map(|(element, child)| (*element, child.store.clone()))
            .collect()
    }

    pub fn store(&self, element: StackElementId) -> Option<Store<C, CA>> {
        self.inner
            .children
            .lock()
            .iter()
            .find(|(id, _)| *id == element)
            .map(|(_, child)| child.store.clone())
    }

    /// Ask the parent to pop `element` and everything above it.
    pub fn pop_from(&self, element: StackElementId) -> StoreTask {
        {
            let mut children = self.inner.children.lock();
            let Some(index) = children.iter().position(|(id, _)| *id == element) else {
                return StoreTask::empty();
            };
            for (_, child) in children[index..].iter_mut() {
                if !child.dismissing {
                    child.dismissing = true;
                    self.inner.events.record(LifecycleEvent::Dismissed {
                        id: child.id,
                        reason: DismissReason::Explicit,
                    });
                }
            }
        }
        self.inner
            .parent
            .send((self.inner.from_action)(StackAction::PopFrom { id: element }))
    }

    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.inner.events.snapshot()
    }

    pub fn live_count(&self) -> usize {
        self.inner.events.live_count()
    }
}

impl<P, PA, C, CA> StackInner<P, PA, C, CA>
where
    P: State,
    PA: Action,
    C: Clone + Send + 'static,
    CA: Action,
{
    fn sync(&self) {
        let to_state = self.to_state;
        let entries = self.parent.with_state(|parent| to_state(parent).identities());
        let mut children = self.children.lock();

        let (kept, removed): (Vec<_>, Vec<_>) = std::mem::take(&mut *children)
            .into_iter()
            .partition(|(element, child)| entries.contains(&(*element, child.id)));
        for (_, child) in removed {
            tear_down(&self.parent, &self.events, child);
        }

        let mut kept: Vec<_> = kept.into_iter().map(Some).collect();
        for (element, id) in entries {
            let existing = kept
                .iter_mut()
                .find(|slot| matches!(slot, Some((e, c)) if *e == element && c.id == id))
                .and_then(Option::take);
            if let Some(existing) = existing {
                children.push(existing);
                continue;
            }
            let from_action = self.from_action;
            let store = self.parent.scope_navigation(
                id,
                move |parent: &P| {
                    to_state(parent)
                        .entry(element)
                        .filter(|(identity, _)| *identity == id)
                        .map(|(_, state)| state.clone())
                },
                move |action| from_action(StackAction::Element { id: element, action }),
            );
            if let Some(store) = store {
                self.events.record(LifecycleEvent::Created(id));
                children.push((
                    element,
                    Child {
                        id,
                        store,
                        dismissing: false,
                    },
                ));
            }
        }
    }
}

impl<P, PA, C, CA> StoreObserver for StackInner<P, PA, C, CA>
where
    P: State,
    PA: Action,
    C: Clone + Send + 'static,
    CA: Action,
{
    fn state_did_change(&self) {
        self.sync();
    }
}

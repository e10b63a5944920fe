use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::identity::StateId;
use crate::reducer::{Action, State};

use super::{DismissHook, DismissReason, Shared, Store, StoreCore, StoreTask};

type ToChild<P, C> = Box<dyn Fn(&P) -> Option<C> + Send + Sync>;
type FromChild<CA, PA> = Box<dyn Fn(CA) -> PA + Send + Sync>;

#[derive(Default)]
struct Dismissal {
    reason: Option<DismissReason>,
    hooks: Vec<DismissHook>,
}

/// Store derived from a parent by projecting state and embedding actions.
///
/// Holds no state of its own beyond the last projected value, which is what
/// readers see after the child disappeared from the parent. A store created
/// for a presented or stacked child also carries that child's navigation
/// identity and its dismissal hooks.
pub(crate) struct ScopedCore<P: State, PA: Action, C, CA> {
    parent: Store<P, PA>,
    to_child: ToChild<P, C>,
    from_child: FromChild<CA, PA>,
    last: Mutex<C>,
    invalidated: AtomicBool,
    navigation: Option<StateId>,
    dismissal: Mutex<Dismissal>,
}

impl<P: State, PA: Action, C, CA> ScopedCore<P, PA, C, CA> {
    pub(crate) fn new(
        parent: Store<P, PA>,
        initial: C,
        to_child: ToChild<P, C>,
        from_child: FromChild<CA, PA>,
        navigation: Option<StateId>,
    ) -> Self {
        Self {
            parent,
            to_child,
            from_child,
            last: Mutex::new(initial),
            invalidated: AtomicBool::new(false),
            navigation,
            dismissal: Mutex::new(Dismissal::default()),
        }
    }
}

impl<P, PA, C, CA> StoreCore<C, CA> for ScopedCore<P, PA, C, CA>
where
    P: State,
    PA: Action,
    C: Clone + Send + 'static,
    CA: Action,
{
    fn send(&self, action: CA) -> StoreTask {
        if self.is_invalidated() {
            tracing::trace!(action = ?action, "action sent to a dismissed child store dropped");
            return StoreTask::empty();
        }
        self.parent.send((self.from_child)(action))
    }

    fn read(&self, reader: &mut dyn FnMut(&C)) {
        let mut fresh = None;
        if !self.is_invalidated() {
            self.parent.core.read(&mut |parent| fresh = (self.to_child)(parent));
        }
        let snapshot = {
            let mut last = self.last.lock();
            if let Some(fresh) = fresh {
                *last = fresh;
            }
            last.clone()
        };
        reader(&snapshot);
    }

    fn shared(&self) -> &Arc<Shared> {
        self.parent.core.shared()
    }

    fn invalidate(&self) {
        self.invalidated.store(true, Ordering::SeqCst);
    }

    fn is_invalidated(&self) -> bool {
        self.invalidated.load(Ordering::SeqCst) || self.parent.core.is_invalidated()
    }

    fn navigation_path(&self) -> Vec<StateId> {
        let mut path = self.parent.core.navigation_path();
        path.extend(self.navigation);
        path
    }

    fn on_dismiss(&self, hook: DismissHook) {
        if self.navigation.is_none() {
            self.parent.core.on_dismiss(hook);
            return;
        }
        let reason = {
            let mut dismissal = self.dismissal.lock();
            match dismissal.reason {
                Some(reason) => reason,
                None => {
                    dismissal.hooks.push(hook);
                    return;
                }
            }
        };
        hook(reason);
    }

    fn notify_dismissed(&self, reason: DismissReason) {
        let hooks = {
            let mut dismissal = self.dismissal.lock();
            if dismissal.reason.is_some() {
                return;
            }
            dismissal.reason = Some(reason);
            std::mem::take(&mut dismissal.hooks)
        };
        for hook in hooks {
            hook(reason);
        }
    }

    fn dismissal(&self) -> Option<DismissReason> {
        self.dismissal
            .lock()
            .reason
            .or_else(|| self.parent.core.dismissal())
    }
}

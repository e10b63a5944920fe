//! Shared test features: a counter with a fact request and a timer, plus a
//! sheet parent and a stack parent embedding it.

#![allow(dead_code, unused_imports)]

use std::future::Future;
use std::time::Duration;

use statecraft::dependencies::{dependency, ClockKey};
use statecraft::{
    Effect, PresentationAction, PresentationState, Reduce, Reducer, ReducerExt, StackAction,
    StackElementId, StackState,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CounterState {
    pub count: i64,
    pub fact: Option<String>,
    pub is_timer_running: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CounterAction {
    Close,
    Decrement,
    FactButtonTapped,
    FactResponse(String),
    Increment,
    StartTimer,
    StopTimer,
    TimerTick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId;

pub struct CounterReducer;

impl Reducer for CounterReducer {
    type State = CounterState;
    type Action = CounterAction;

    fn reduce(&self, state: &mut Self::State, action: &Self::Action) -> Effect<Self::Action> {
        match action {
            CounterAction::Close => Effect::dismiss(),
            CounterAction::Decrement => {
                state.count -= 1;
                Effect::none()
            }
            CounterAction::FactButtonTapped => {
                let count = state.count;
                Effect::future(async move {
                    tokio::task::yield_now().await;
                    Some(CounterAction::FactResponse(format!(
                        "{count} is a good number"
                    )))
                })
            }
            CounterAction::FactResponse(fact) => {
                state.fact = Some(fact.clone());
                Effect::none()
            }
            CounterAction::Increment => {
                state.count += 1;
                Effect::none()
            }
            CounterAction::StartTimer => {
                state.is_timer_running = true;
                let clock = dependency::<ClockKey>();
                Effect::run(move |emitter| async move {
                    loop {
                        clock.sleep(Duration::from_secs(1)).await;
                        if emitter.is_cancelled() {
                            break;
                        }
                        emitter.emit(CounterAction::TimerTick);
                    }
                })
                .cancellable(TimerId)
            }
            CounterAction::StopTimer => {
                state.is_timer_running = false;
                Effect::cancel(TimerId)
            }
            CounterAction::TimerTick => {
                state.count += 1;
                Effect::none()
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetState {
    pub sheet: PresentationState<CounterState>,
    pub dismissals: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SheetAction {
    Open,
    Close,
    Sheet(PresentationAction<CounterAction>),
}

pub fn sheet_reducer() -> impl Reducer<State = SheetState, Action = SheetAction> {
    Reduce::new(|state: &mut SheetState, action: &SheetAction| {
        match action {
            SheetAction::Open => state.sheet.present(CounterState::default()),
            SheetAction::Close => {
                state.sheet.dismiss();
            }
            SheetAction::Sheet(PresentationAction::Dismiss) => state.dismissals += 1,
            SheetAction::Sheet(PresentationAction::Presented(_)) => {}
        }
        Effect::none()
    })
    .if_let(
        |state| &mut state.sheet,
        |action| match action {
            SheetAction::Sheet(action) => Some(action),
            _ => None,
        },
        SheetAction::Sheet,
        CounterReducer,
    )
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathState {
    pub path: StackState<CounterState>,
    pub pops: Vec<StackElementId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathAction {
    PushCounter,
    Path(StackAction<CounterState, CounterAction>),
}

pub fn path_reducer() -> impl Reducer<State = PathState, Action = PathAction> {
    Reduce::new(|state: &mut PathState, action: &PathAction| {
        match action {
            PathAction::PushCounter => {
                state.path.push(CounterState::default());
            }
            PathAction::Path(StackAction::PopFrom { id }) => state.pops.push(*id),
            PathAction::Path(_) => {}
        }
        Effect::none()
    })
    .for_each(
        |state| &mut state.path,
        |action| match action {
            PathAction::Path(action) => Some(action),
            _ => None,
        },
        PathAction::Path,
        CounterReducer,
    )
}

pub fn element(id: u64, action: CounterAction) -> PathAction {
    PathAction::Path(StackAction::Element {
        id: StackElementId::new(id),
        action,
    })
}

pub fn sheet(action: CounterAction) -> SheetAction {
    SheetAction::Sheet(PresentationAction::Presented(action))
}

/// Fail the test if `future` does not finish within a second.
pub async fn within_second<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(1), future)
        .await
        .expect("timed out")
}

/// Let spawned effect tasks run on a current-thread runtime.
pub async fn yield_many(times: usize) {
    for _ in 0..times {
        tokio::task::yield_now().await;
    }
}

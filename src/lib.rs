//! Unidirectional state runtime.
//!
//! State is mutated only by reducers in response to actions, and asynchronous
//! work is described by cancellable, composable effects.
//!
//! # Architecture
//!
//! ```text
//! Action ──→ Store::send ──→ Reducer ──→ State
//!    ↑                          │
//!    │                          ▼
//!    └────────────────────── Effect (tokio task)
//! ```
//!
//! - [`reducer`]: the `Reducer` trait and its composition operators
//! - [`effect`]: effect values, emitters and cancellation ids
//! - [`store`]: the runtime owning state, serializing mutations and running effects
//! - [`navigation`]: presentation and stack state with identity tokens
//! - [`test_store`]: exhaustive assertion harness
//! - [`dependencies`]: scoped, overridable dependency handles

pub mod config;
pub mod dependencies;
pub mod effect;
pub mod identity;
pub mod logging;
pub mod misuse;
pub mod navigation;
pub mod reducer;
pub mod standups;
pub mod store;
pub mod test_store;

pub use effect::{CancelId, CancelKey, CancellationToken, Effect, Emitter};
pub use identity::{Identity, IdentityEq, ObservableState, StateId};
pub use navigation::{
    PresentationAction, PresentationState, StackAction, StackElementId, StackState,
};
pub use reducer::{Reduce, Reducer, ReducerExt, Scope};
pub use store::{PresentationStore, StackStore, Store, StoreTask};
pub use test_store::{Exhaustivity, TestStore, TestStoreFailure};

//! Navigation state: a single optional presented child, and an ordered stack.

mod presentation;
mod stack;

pub use presentation::{PresentationAction, PresentationState};
pub use stack::{StackAction, StackElementId, StackPushError, StackState};

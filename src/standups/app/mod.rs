//! Root feature: the standups list plus a navigation stack of detail and
//! record screens.

mod action;
mod reducer;
mod state;

pub use action::{AppAction, PathAction};
pub use reducer::reducer;
pub use state::{AppState, PathState};

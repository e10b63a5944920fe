//! Standup detail screen.
//!
//! Presents either the edit form or a delete confirmation alert, and reports
//! deletion and meeting start to its parent through delegate actions.

mod action;
mod reducer;
mod state;

pub use action::{AlertAction, DestinationAction, DetailAction, DetailDelegate};
pub use reducer::reducer;
pub use state::{ConfirmationAlert, DetailDestination, DetailState};

//! Record meeting screen.
//!
//! Runs a speech recognition stream and a one-second timer side by side.
//! Speaking time rotates through the attendees; when the last attendee's time
//! is up the transcript is handed to the parent for saving.

mod action;
mod reducer;
mod state;

pub use action::{RecordAction, RecordDelegate};
pub use reducer::RecordReducer;
pub use state::RecordState;

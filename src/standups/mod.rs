//! Standups reference app.
//!
//! A list of standups, a detail screen with an edit form and a delete
//! confirmation, and a record-meeting screen driven by a speech stream and a
//! clock timer. Navigation between detail and record screens is a stack owned
//! by the app feature.
//!
//! # Architecture
//!
//! Each feature follows the same layout:
//! - `state.rs` - feature state
//! - `action.rs` - user events, effect feedback and delegate actions
//! - `reducer.rs` - state transitions and effects

pub mod app;
pub mod clients;
pub mod detail;
pub mod form;
pub mod list;
pub mod models;
pub mod record;

pub use app::{AppAction, AppState, PathAction, PathState};
pub use models::{Attendee, Meeting, Standup};

//! Base trait for actions.

use std::fmt::Debug;

/// Marker trait for action values.
///
/// Actions represent:
/// - User events (button taps, text input)
/// - Effect feedback (timer ticks, responses)
/// - Delegate messages from children to parents
///
/// `Debug` is required so the store and test harness can log and diff them.
pub trait Action: Debug + Send + 'static {}

impl<T: Debug + Send + 'static> Action for T {}

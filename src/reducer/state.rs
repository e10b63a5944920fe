//! Base trait for feature state.

/// Marker trait for state owned by a store.
///
/// States are mutated in place by reducers and may be moved to whichever
/// thread drains the store's action queue.
pub trait State: Send + 'static {}

impl<T: Send + 'static> State for T {}

//! Observable state of a cache entry and external revalidation triggers.

use std::fmt;
use std::sync::Arc;

/// Snapshot of a cache entry as seen by a subscriber
///
/// `data` and `error` may both be present: a failed revalidation keeps the
/// last good data alongside the new error.
pub struct CacheState<V, E> {
    /// Last successfully fetched or locally mutated value
    pub data: Option<Arc<V>>,
    /// Error from the most recent fetch, cleared by success or mutation
    pub error: Option<E>,
    /// Neither data nor an error has been recorded yet
    pub is_loading: bool,
    /// A fetch for this entry is in flight
    pub is_validating: bool,
}

impl<V, E> CacheState<V, E> {
    /// True when the entry holds an error and no data to fall back on
    pub fn is_error(&self) -> bool {
        self.data.is_none() && self.error.is_some()
    }
}

impl<V, E> Default for CacheState<V, E> {
    fn default() -> Self {
        Self { data: None, error: None, is_loading: false, is_validating: false }
    }
}

impl<V, E: Clone> Clone for CacheState<V, E> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            error: self.error.clone(),
            is_loading: self.is_loading,
            is_validating: self.is_validating,
        }
    }
}

impl<V: fmt::Debug, E: fmt::Debug> fmt::Debug for CacheState<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheState")
            .field("data", &self.data)
            .field("error", &self.error)
            .field("is_loading", &self.is_loading)
            .field("is_validating", &self.is_validating)
            .finish()
    }
}

/// Host events that trigger revalidation of every subscribed key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RevalidateEvent {
    /// The host window or app regained focus
    Focus,
    /// Network connectivity was restored
    Reconnect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_idle() {
        let state: CacheState<u32, String> = CacheState::default();
        assert!(state.data.is_none());
        assert!(!state.is_loading);
        assert!(!state.is_validating);
        assert!(!state.is_error());
    }

    #[test]
    fn test_error_with_stale_data_is_not_error_state() {
        let state: CacheState<u32, String> = CacheState {
            data: Some(Arc::new(1)),
            error: Some("offline".to_string()),
            ..CacheState::default()
        };
        assert!(!state.is_error());
    }
}

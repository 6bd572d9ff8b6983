//! Progress transitions
//!
//! [`reconcile`] holds the pure functions that fold a backend answer into a
//! cached snapshot; [`service`] wires them to the API and the dashboard cache.

pub mod reconcile;
pub mod service;

use adoptly_domain::{AnalysisId, FetchError, ValidationError};
use thiserror::Error;

pub use reconcile::{apply_progress_update, merge_badges, reconcile, validate_transition};
pub use service::{ProgressTransitionHandler, TransitionOutcome};

/// A status change that did not reach the cache
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    /// Rejected locally; no request was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The dashboard for this analysis has not been loaded yet
    #[error("Dashboard for analysis {0} is not loaded")]
    NotLoaded(AnalysisId),

    /// The backend call failed; the cached snapshot is unchanged
    #[error("Progress update failed: {0}")]
    Fetch(#[from] FetchError),
}

impl TransitionError {
    /// Whether the UI should offer to send the same request again
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch(error) => error.is_retryable(),
            Self::Validation(_) | Self::NotLoaded(_) => false,
        }
    }
}

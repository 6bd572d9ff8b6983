//! Progress transition service
//!
//! Validates a status change against the cached snapshot, sends it to the
//! backend, and mutates the backend's answer into the dashboard cache
//! without refetching.

use std::sync::Arc;

use adoptly_common::resilience::{Clock, SystemClock};
use adoptly_domain::{Badge, OpportunityType, TaskStatus, ValidationError};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use super::reconcile::{apply_progress_update, validate_transition};
use super::TransitionError;
use crate::dashboard::DashboardHandle;
use crate::ports::DashboardApi;

/// Result of a status change the backend accepted
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    /// Status the backend settled on
    pub new_status: TaskStatus,
    /// Message from the backend, shown to the user as is
    pub message: String,
    /// Badges unlocked by this change
    pub badges_earned: Vec<Badge>,
    /// False when the backend kept a different status than requested
    pub honored: bool,
}

/// Sends gap status changes and reconciles the answers into the cache
pub struct ProgressTransitionHandler {
    api: Arc<dyn DashboardApi>,
    clock: Arc<dyn Clock>,
}

impl ProgressTransitionHandler {
    /// Create a handler on the system clock
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        Self { api, clock: Arc::new(SystemClock) }
    }

    /// Stamp `marked_date` and badges from `clock` instead of the system
    /// clock
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Move the gap for `opportunity` to `requested`
    ///
    /// Local validation runs before any request. On success the cached
    /// snapshot is replaced with the reconciled one; on failure it is left
    /// untouched.
    #[instrument(
        skip(self, dashboard),
        fields(analysis_id = ?dashboard.analysis_id())
    )]
    pub async fn update_status<C: Clock>(
        &self,
        dashboard: &DashboardHandle<C>,
        opportunity: OpportunityType,
        requested: TaskStatus,
    ) -> Result<TransitionOutcome, TransitionError> {
        let id = dashboard.analysis_id().ok_or(ValidationError::InactiveKey)?;
        let snapshot =
            dashboard.snapshot().ok_or_else(|| TransitionError::NotLoaded(id.clone()))?;
        let current =
            snapshot.gap(opportunity).ok_or(ValidationError::UnknownGap(opportunity))?.status;

        if let Err(error) = validate_transition(current, requested) {
            debug!(%current, %requested, error = %error, "Transition rejected locally");
            return Err(error.into());
        }

        let response = match self.api.submit_progress_update(id, opportunity, requested).await {
            Ok(response) => response,
            Err(error) => {
                warn!(
                    %current,
                    %requested,
                    category = error.category(),
                    error = %error,
                    "Progress update failed; cache left unchanged"
                );
                return Err(error.into());
            }
        };

        let now = self.now();
        let applied = dashboard.mutate_with(|cached| {
            cached.map(|data| apply_progress_update(data, opportunity, &response, now))
        });
        if applied.is_none() {
            debug!("Snapshot disappeared before the progress answer could be applied");
        }

        let honored = response.new_status == requested;
        if honored {
            info!(
                %current,
                new_status = %response.new_status,
                badges = response.badges_earned.len(),
                "Progress updated"
            );
        } else {
            info!(
                %current,
                %requested,
                new_status = %response.new_status,
                "Backend kept a different status than requested"
            );
        }

        Ok(TransitionOutcome {
            new_status: response.new_status,
            message: response.message,
            badges_earned: response.badges_earned,
            honored,
        })
    }

    fn now(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from(self.clock.system_time())
    }
}

impl std::fmt::Debug for ProgressTransitionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTransitionHandler").finish_non_exhaustive()
    }
}

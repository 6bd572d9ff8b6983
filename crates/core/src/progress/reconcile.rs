//! Pure reconciliation of backend progress answers into cached state
//!
//! The backend is authoritative: whatever `new_status` it returns is what the
//! cache shows, even when it differs from the requested status.

use adoptly_domain::{
    Badge, DashboardData, Gap, OpportunityType, ProgressSummary, TaskStatus,
    UpdateProgressResponse, ValidationError,
};
use chrono::{DateTime, Utc};

/// Reject transitions the backend would never honor
///
/// Only two moves are refused: to the current status, and out of
/// `IMPLEMENTED`. Every other move, backwards included, is allowed.
pub fn validate_transition(
    current: TaskStatus,
    requested: TaskStatus,
) -> Result<(), ValidationError> {
    if current == requested {
        return Err(ValidationError::NoOp(current));
    }
    if current.is_terminal() {
        return Err(ValidationError::TerminalState { from: current, to: requested });
    }
    Ok(())
}

/// Apply the backend's answer to one gap
///
/// `marked_date` is cleared for `NOT_STARTED`, stamped with `now` when the
/// status changed, and otherwise kept. Applying the same response twice
/// yields the same gap.
pub fn reconcile(cached: &Gap, response: &UpdateProgressResponse, now: DateTime<Utc>) -> Gap {
    let status = response.new_status;
    let marked_date = match status {
        TaskStatus::NotStarted => None,
        _ if status != cached.status => Some(now),
        _ => cached.marked_date.or(Some(now)),
    };

    Gap { status, marked_date, ..cached.clone() }
}

/// Upsert earned badges by type
///
/// Locked entries are unlocked, unknown types are appended, and badges that
/// are already earned keep their original timestamp.
pub fn merge_badges(badges: &[Badge], earned: &[Badge], now: DateTime<Utc>) -> Vec<Badge> {
    let mut merged = badges.to_vec();

    for badge in earned {
        let earned_at = badge.earned_at.unwrap_or(now);
        match merged.iter_mut().find(|existing| existing.badge_type == badge.badge_type) {
            Some(existing) => {
                existing.earned_at.get_or_insert(earned_at);
            }
            None => merged.push(Badge { earned_at: Some(earned_at), ..badge.clone() }),
        }
    }

    merged
}

/// Fold a progress response into a snapshot
///
/// Only the gap for `opportunity` changes. Badges are merged and the progress
/// summary is recomputed from the gap statuses; the metrics summary stays as
/// the backend last sent it.
pub fn apply_progress_update(
    snapshot: &DashboardData,
    opportunity: OpportunityType,
    response: &UpdateProgressResponse,
    now: DateTime<Utc>,
) -> DashboardData {
    let top_3_gaps: Vec<Gap> = snapshot
        .top_3_gaps
        .iter()
        .map(|gap| {
            if gap.opportunity_type == opportunity {
                reconcile(gap, response, now)
            } else {
                gap.clone()
            }
        })
        .collect();

    DashboardData {
        progress_summary: ProgressSummary::from_statuses(top_3_gaps.iter().map(|gap| gap.status)),
        badges: merge_badges(&snapshot.badges, &response.badges_earned, now),
        top_3_gaps,
        ..snapshot.clone()
    }
}

//! Progress aggregates and the status-change exchange

use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use super::badge::Badge;
use super::gap::{OpportunityType, TaskStatus};

/// Counters derived from the gap statuses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct ProgressSummary {
    pub total_tasks: u32,
    pub tasks_not_started: u32,
    pub tasks_in_progress: u32,
    pub tasks_implemented: u32,
    /// `round(100 * implemented / total)`, 0 when there are no tasks
    pub completion_percentage: f64,
}

impl ProgressSummary {
    /// Recompute the summary from gap statuses
    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = TaskStatus>,
    {
        let mut summary = Self::default();
        for status in statuses {
            summary.total_tasks += 1;
            match status {
                TaskStatus::NotStarted => summary.tasks_not_started += 1,
                TaskStatus::InProgress => summary.tasks_in_progress += 1,
                TaskStatus::Implemented => summary.tasks_implemented += 1,
            }
        }
        summary.completion_percentage = if summary.total_tasks == 0 {
            0.0
        } else {
            (100.0 * f64::from(summary.tasks_implemented) / f64::from(summary.total_tasks)).round()
        };
        summary
    }

    /// The per-status counts add up to the total
    pub fn is_consistent(&self) -> bool {
        self.tasks_not_started + self.tasks_in_progress + self.tasks_implemented
            == self.total_tasks
    }
}

/// Body of a status-change request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct UpdateProgressRequest {
    pub opportunity_type: OpportunityType,
    pub status: TaskStatus,
}

/// Backend's authoritative answer to a status-change request
///
/// `new_status` may differ from the requested status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct UpdateProgressResponse {
    pub message: String,
    pub new_status: TaskStatus,
    /// Badges this transition unlocked
    #[serde(default)]
    pub badges_earned: Vec<Badge>,
}

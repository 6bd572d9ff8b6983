//! Gaps: the three improvement opportunities of an analysis

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use crate::constants::{MAX_COMPLEXITY, MIN_COMPLEXITY};
use crate::impl_domain_status_conversions;

/// Area of the business a gap belongs to; the stable key of a gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum OpportunityType {
    DigitalPresence,
    ValueCreation,
    BusinessManagement,
}

impl OpportunityType {
    /// Every opportunity type, in display order
    pub const ALL: [Self; 3] =
        [Self::DigitalPresence, Self::ValueCreation, Self::BusinessManagement];
}

impl_domain_status_conversions!(OpportunityType {
    DigitalPresence => "digital_presence",
    ValueCreation => "value_creation",
    BusinessManagement => "business_management",
});

/// Remediation status of a gap
///
/// Ordered `NotStarted < InProgress < Implemented`. `Implemented` is
/// terminal.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Implemented,
}

impl TaskStatus {
    /// No transition leaves this status
    pub fn is_terminal(self) -> bool {
        self == Self::Implemented
    }
}

impl_domain_status_conversions!(TaskStatus {
    NotStarted => "NOT_STARTED",
    InProgress => "IN_PROGRESS",
    Implemented => "IMPLEMENTED",
});

/// One improvement opportunity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct Gap {
    pub opportunity_type: OpportunityType,

    /// Estimated hours recoverable per week
    pub hours_per_week: f64,

    /// Estimated hours recoverable per year
    pub hours_per_year: f64,

    pub problem_summary: String,

    /// 1 (trivial) to 10 (major project)
    pub complexity: u8,

    /// Suggested tool or category of tool
    pub tool_hint: String,

    #[serde(default)]
    pub status: TaskStatus,

    /// When the status last changed; `None` exactly when not started
    #[serde(default)]
    pub marked_date: Option<DateTime<Utc>>,
}

impl Gap {
    /// Complexity lies in the 1-10 scale
    pub fn has_valid_complexity(&self) -> bool {
        (MIN_COMPLEXITY..=MAX_COMPLEXITY).contains(&self.complexity)
    }

    /// `marked_date` is present iff the task has started
    pub fn has_consistent_marked_date(&self) -> bool {
        (self.status == TaskStatus::NotStarted) == self.marked_date.is_none()
    }
}

//! The analysis aggregate as served by the dashboard endpoint

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use super::badge::Badge;
use super::gap::{Gap, OpportunityType, TaskStatus};
use super::progress::ProgressSummary;
use crate::constants::GAP_COUNT;
use crate::errors::SnapshotError;

/// Identifier of an analysis
///
/// Never empty: an absent or blank id is modelled as `Option<AnalysisId>::None`
/// and means "do not fetch".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(try_from = "String", into = "String")]
pub struct AnalysisId(String);

impl AnalysisId {
    /// Trimmed id, or `None` for an empty or whitespace-only string
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AnalysisId {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(&raw).ok_or_else(|| "analysis id must not be blank".to_owned())
    }
}

impl From<AnalysisId> for String {
    fn from(id: AnalysisId) -> Self {
        id.0
    }
}

impl fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AnalysisId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Company metadata the analysis was computed for
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct IdentityA1 {
    pub company_name: String,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub employee_range: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

/// Sub-scores of the analysis
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct ScoreA2 {
    pub digital_presence: f64,
    pub value_creation: f64,
    pub business_management: f64,
    pub overall: f64,
}

impl ScoreA2 {
    /// Sub-score for one opportunity area
    pub fn for_opportunity(&self, opportunity: OpportunityType) -> f64 {
        match opportunity {
            OpportunityType::DigitalPresence => self.digital_presence,
            OpportunityType::ValueCreation => self.value_creation,
            OpportunityType::BusinessManagement => self.business_management,
        }
    }
}

/// Potential versus realised time savings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct MetricsSummary {
    pub potential_hours_per_week: f64,
    pub potential_hours_per_year: f64,
    pub actual_hours_saved_per_week: f64,
    pub actual_hours_saved_per_year: f64,
    /// `None` until an hourly rate has been supplied
    #[serde(default)]
    pub estimated_money_value: Option<f64>,
}

/// Full dashboard snapshot for one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct DashboardData {
    pub analysis_id: AnalysisId,
    pub identity_a1: IdentityA1,
    pub score_a2: ScoreA2,
    pub top_3_gaps: Vec<Gap>,
    pub progress_summary: ProgressSummary,
    pub metrics_summary: MetricsSummary,
    #[serde(default)]
    pub badges: Vec<Badge>,
}

impl DashboardData {
    /// Check the analysis invariants: one gap per opportunity type, 1-10
    /// complexity, and `marked_date` set iff the task has started
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.top_3_gaps.len() != GAP_COUNT {
            return Err(SnapshotError::GapCount {
                expected: GAP_COUNT,
                found: self.top_3_gaps.len(),
            });
        }

        let mut seen = HashSet::with_capacity(GAP_COUNT);
        for gap in &self.top_3_gaps {
            let opportunity = gap.opportunity_type;
            if !seen.insert(opportunity) {
                return Err(SnapshotError::DuplicateGap(opportunity));
            }
            if !gap.has_valid_complexity() {
                return Err(SnapshotError::ComplexityOutOfRange {
                    opportunity,
                    complexity: gap.complexity,
                });
            }
            match (gap.status, gap.marked_date.is_some()) {
                (TaskStatus::NotStarted, true) => {
                    return Err(SnapshotError::UnexpectedMarkedDate(opportunity));
                }
                (status, false) if status != TaskStatus::NotStarted => {
                    return Err(SnapshotError::MissingMarkedDate { opportunity, status });
                }
                _ => {}
            }
        }

        Ok(())
    }

    pub fn gap(&self, opportunity: OpportunityType) -> Option<&Gap> {
        self.top_3_gaps.iter().find(|gap| gap.opportunity_type == opportunity)
    }

    pub fn gap_mut(&mut self, opportunity: OpportunityType) -> Option<&mut Gap> {
        self.top_3_gaps.iter_mut().find(|gap| gap.opportunity_type == opportunity)
    }

    pub fn earned_badges(&self) -> impl Iterator<Item = &Badge> {
        self.badges.iter().filter(|badge| badge.is_earned())
    }

    /// Summary recomputed from the current gap statuses
    pub fn computed_progress(&self) -> ProgressSummary {
        ProgressSummary::from_statuses(self.top_3_gaps.iter().map(|gap| gap.status))
    }
}

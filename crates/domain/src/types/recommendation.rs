//! AI-generated next-task recommendation

use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use super::gap::Gap;
use crate::constants::MAX_PRIORITY_SCORE;

/// Which gap to tackle next, and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct RecommendationData {
    pub next_task: Gap,
    pub reasoning: String,
    /// 0 to 10
    pub priority_score: f64,
}

impl RecommendationData {
    /// Priority clamped into the 0-10 scale
    pub fn priority(&self) -> f64 {
        if self.priority_score.is_nan() {
            0.0
        } else {
            self.priority_score.clamp(0.0, MAX_PRIORITY_SCORE)
        }
    }
}

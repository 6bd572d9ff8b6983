//! Gamification badges

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use crate::impl_domain_status_conversions;

/// The five badges the backend can award
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum BadgeType {
    FirstStep,
    Momentum,
    QuickWin,
    DigitalPioneer,
    AiChampion,
}

impl BadgeType {
    pub const ALL: [Self; 5] =
        [Self::FirstStep, Self::Momentum, Self::QuickWin, Self::DigitalPioneer, Self::AiChampion];
}

impl_domain_status_conversions!(BadgeType {
    FirstStep => "first_step",
    Momentum => "momentum",
    QuickWin => "quick_win",
    DigitalPioneer => "digital_pioneer",
    AiChampion => "ai_champion",
});

/// Catalog entry plus the time this analysis earned it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct Badge {
    pub badge_type: BadgeType,
    pub name: String,
    pub description: String,
    pub icon: String,
    /// `None` while locked
    #[serde(default)]
    pub earned_at: Option<DateTime<Utc>>,
}

impl Badge {
    pub fn is_earned(&self) -> bool {
        self.earned_at.is_some()
    }
}

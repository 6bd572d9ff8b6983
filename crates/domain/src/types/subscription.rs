//! Progress email subscription

use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use crate::impl_domain_status_conversions;

/// How often progress emails are sent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum EmailFrequency {
    #[default]
    Weekly,
    Biweekly,
    Monthly,
}

impl_domain_status_conversions!(EmailFrequency {
    Weekly => "weekly",
    Biweekly => "biweekly",
    Monthly => "monthly",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct SubscribeRequest {
    pub email: String,
    pub frequency: EmailFrequency,
    /// Used by the backend to put a money value on hours saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct SubscribeResponse {
    pub message: String,
    pub email: String,
    pub frequency: EmailFrequency,
    /// Date of the next scheduled email as sent by the backend
    pub next_email_date: String,
}

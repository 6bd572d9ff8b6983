//! Domain types and models
//!
//! Wire-compatible with the analysis backend: every type (de)serializes with
//! the backend's snake_case field names.

pub mod analysis;
pub mod badge;
pub mod gap;
pub mod progress;
pub mod recommendation;
pub mod subscription;

pub use analysis::{AnalysisId, DashboardData, IdentityA1, MetricsSummary, ScoreA2};
pub use badge::{Badge, BadgeType};
pub use gap::{Gap, OpportunityType, TaskStatus};
pub use progress::{ProgressSummary, UpdateProgressRequest, UpdateProgressResponse};
pub use recommendation::RecommendationData;
pub use subscription::{EmailFrequency, SubscribeRequest, SubscribeResponse};

//! Port interfaces for the analysis backend
//!
//! The infra layer implements [`DashboardApi`] over HTTP; tests implement it
//! in memory.

use adoptly_domain::{
    AnalysisId, DashboardData, FetchError, OpportunityType, RecommendationData, SubscribeRequest,
    SubscribeResponse, TaskStatus, UpdateProgressResponse,
};
use async_trait::async_trait;

/// Result of a backend call
pub type FetchResult<T> = Result<T, FetchError>;

/// Typed access to the analysis backend
///
/// Implementations make exactly one request per call; retries belong to the
/// caches.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Full dashboard snapshot for an analysis
    async fn fetch_dashboard(&self, id: &AnalysisId) -> FetchResult<DashboardData>;

    /// Next-task recommendation for an analysis
    async fn fetch_recommendation(&self, id: &AnalysisId) -> FetchResult<RecommendationData>;

    /// Request a status change for one gap
    async fn submit_progress_update(
        &self,
        id: &AnalysisId,
        opportunity: OpportunityType,
        status: TaskStatus,
    ) -> FetchResult<UpdateProgressResponse>;

    /// Subscribe an email address to progress emails
    async fn subscribe(&self, request: &SubscribeRequest) -> FetchResult<SubscribeResponse>;
}

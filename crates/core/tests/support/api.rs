//! Scripted in-memory `DashboardApi`
//!
//! Every method pops the next scripted result for its endpoint and falls back
//! to a default when the script is empty. Calls are counted per endpoint.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use adoptly_core::DashboardApi;
use adoptly_domain::fixtures::{sample_dashboard, sample_recommendation};
use adoptly_domain::{
    AnalysisId, DashboardData, FetchError, OpportunityType, RecommendationData,
    SubscribeRequest, SubscribeResponse, TaskStatus, UpdateProgressResponse,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

type Scripted<T> = Mutex<VecDeque<Result<T, FetchError>>>;

#[derive(Default)]
pub struct Calls {
    pub dashboard: AtomicUsize,
    pub recommendation: AtomicUsize,
    pub progress: AtomicUsize,
    pub subscribe: AtomicUsize,
}

/// In-memory backend driven by per-endpoint scripts
#[derive(Default)]
pub struct ScriptedApi {
    pub calls: Calls,
    dashboards: Scripted<DashboardData>,
    recommendations: Scripted<RecommendationData>,
    progress: Scripted<UpdateProgressResponse>,
    subscriptions: Scripted<SubscribeResponse>,
    progress_requests: Mutex<Vec<(AnalysisId, OpportunityType, TaskStatus)>>,
    subscribe_requests: Mutex<Vec<SubscribeRequest>>,
    dashboard_gate: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_dashboard(&self, result: Result<DashboardData, FetchError>) {
        self.dashboards.lock().push_back(result);
    }

    pub fn push_recommendation(&self, result: Result<RecommendationData, FetchError>) {
        self.recommendations.lock().push_back(result);
    }

    pub fn push_progress(&self, result: Result<UpdateProgressResponse, FetchError>) {
        self.progress.lock().push_back(result);
    }

    pub fn push_subscription(&self, result: Result<SubscribeResponse, FetchError>) {
        self.subscriptions.lock().push_back(result);
    }

    /// Park every dashboard fetch until the returned gate is notified
    pub fn gate_dashboard(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.dashboard_gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub fn dashboard_calls(&self) -> usize {
        self.calls.dashboard.load(Ordering::SeqCst)
    }

    pub fn recommendation_calls(&self) -> usize {
        self.calls.recommendation.load(Ordering::SeqCst)
    }

    pub fn progress_calls(&self) -> usize {
        self.calls.progress.load(Ordering::SeqCst)
    }

    pub fn subscribe_calls(&self) -> usize {
        self.calls.subscribe.load(Ordering::SeqCst)
    }

    pub fn progress_requests(&self) -> Vec<(AnalysisId, OpportunityType, TaskStatus)> {
        self.progress_requests.lock().clone()
    }

    pub fn subscribe_requests(&self) -> Vec<SubscribeRequest> {
        self.subscribe_requests.lock().clone()
    }
}

#[async_trait]
impl DashboardApi for ScriptedApi {
    async fn fetch_dashboard(&self, id: &AnalysisId) -> Result<DashboardData, FetchError> {
        self.calls.dashboard.fetch_add(1, Ordering::SeqCst);
        let gate = self.dashboard_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let scripted = self.dashboards.lock().pop_front();
        scripted.unwrap_or_else(|| Ok(sample_dashboard(id.as_str())))
    }

    async fn fetch_recommendation(
        &self,
        _id: &AnalysisId,
    ) -> Result<RecommendationData, FetchError> {
        self.calls.recommendation.fetch_add(1, Ordering::SeqCst);
        let scripted = self.recommendations.lock().pop_front();
        scripted.unwrap_or_else(|| Ok(sample_recommendation(OpportunityType::ValueCreation)))
    }

    async fn submit_progress_update(
        &self,
        id: &AnalysisId,
        opportunity: OpportunityType,
        status: TaskStatus,
    ) -> Result<UpdateProgressResponse, FetchError> {
        self.calls.progress.fetch_add(1, Ordering::SeqCst);
        self.progress_requests.lock().push((id.clone(), opportunity, status));
        let scripted = self.progress.lock().pop_front();
        scripted.unwrap_or_else(|| {
            Ok(UpdateProgressResponse {
                message: "Progress updated".to_owned(),
                new_status: status,
                badges_earned: Vec::new(),
            })
        })
    }

    async fn subscribe(&self, request: &SubscribeRequest) -> Result<SubscribeResponse, FetchError> {
        self.calls.subscribe.fetch_add(1, Ordering::SeqCst);
        self.subscribe_requests.lock().push(request.clone());
        let scripted = self.subscriptions.lock().pop_front();
        scripted.unwrap_or_else(|| {
            Ok(SubscribeResponse {
                message: "Subscribed".to_owned(),
                email: request.email.clone(),
                frequency: request.frequency,
                next_email_date: "2025-01-22".to_owned(),
            })
        })
    }
}

//! Recommendation cache
//!
//! The recommendation widget is optional. Fetch failures never reach the
//! consumer: views and loads degrade to `None` and the failure is logged as
//! `DegradedFeature` at debug level.

use std::fmt;
use std::sync::Arc;

use adoptly_common::cache::{CacheStats, CacheStore, RevalidateEvent, Subscription};
use adoptly_common::resilience::{Clock, SystemClock};
use adoptly_domain::{AnalysisId, CacheSettings, FetchError, RecommendationData};
use tracing::debug;

use crate::ports::DashboardApi;
use crate::settings::cache_config;

/// Store backing the recommendation cache
pub type RecommendationStore<C = SystemClock> =
    CacheStore<AnalysisId, RecommendationData, FetchError, C>;

/// Revalidating cache of next-task recommendations
pub struct RecommendationCache<C: Clock = SystemClock> {
    store: RecommendationStore<C>,
}

impl RecommendationCache<SystemClock> {
    /// Create a cache that fetches through `api`
    pub fn new(api: Arc<dyn DashboardApi>, settings: &CacheSettings) -> Self {
        Self::with_clock(api, settings, SystemClock)
    }
}

impl<C: Clock> RecommendationCache<C> {
    /// Create a cache on an explicit clock
    pub fn with_clock(api: Arc<dyn DashboardApi>, settings: &CacheSettings, clock: C) -> Self {
        let store = CacheStore::builder("recommendation", move |id: AnalysisId| {
            let api = Arc::clone(&api);
            async move { api.fetch_recommendation(&id).await }
        })
        .config(cache_config(settings))
        .retry_if(FetchError::is_retryable)
        .clock(clock)
        .build();

        Self { store }
    }

    /// Subscribe to an analysis' recommendation; `None` never fetches
    #[must_use]
    pub fn subscribe(&self, id: Option<AnalysisId>) -> RecommendationHandle<C> {
        RecommendationHandle { subscription: self.store.subscribe(id) }
    }

    /// Forward a host reconnect (or focus, if enabled) event
    pub async fn notify(&self, event: RevalidateEvent) -> usize {
        self.store.notify(event).await
    }

    /// Underlying store, for inspection
    #[must_use]
    pub fn store(&self) -> &RecommendationStore<C> {
        &self.store
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }
}

impl<C: Clock> Clone for RecommendationCache<C> {
    fn clone(&self) -> Self {
        Self { store: self.store.clone() }
    }
}

impl<C: Clock> fmt::Debug for RecommendationCache<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecommendationCache").field("store", &self.store).finish()
    }
}

/// A consumer's subscription to one analysis' recommendation
pub struct RecommendationHandle<C: Clock = SystemClock> {
    subscription: Subscription<AnalysisId, RecommendationData, FetchError, C>,
}

impl<C: Clock> RecommendationHandle<C> {
    /// Analysis this handle follows; `None` for an inactive handle
    #[must_use]
    pub fn analysis_id(&self) -> Option<&AnalysisId> {
        self.subscription.key()
    }

    /// True until the first result or error is recorded
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.subscription.state().is_loading
    }

    /// Recommendation to render, `None` when absent or failed
    #[must_use]
    pub fn view(&self) -> Option<Arc<RecommendationData>> {
        let state = self.subscription.state();
        if let (None, Some(error)) = (&state.data, &state.error) {
            self.degraded(error);
        }
        state.data
    }

    /// Recommendation, fetching on a miss; failures degrade to `None`
    ///
    /// Data older than the freshness window is returned at once while a
    /// background refresh runs.
    pub async fn load(&self) -> Option<Arc<RecommendationData>> {
        match self.subscription.load().await {
            Ok(data) => data,
            Err(error) => {
                self.degraded(&error);
                None
            }
        }
    }

    /// Fetch again unless a fetch completed inside the dedupe window
    pub async fn revalidate(&self) -> Option<Arc<RecommendationData>> {
        match self.subscription.revalidate().await {
            Ok(data) => data,
            Err(error) => {
                self.degraded(&error);
                self.subscription.state().data
            }
        }
    }

    fn degraded(&self, error: &FetchError) {
        debug!(
            feature = "recommendation",
            analysis_id = ?self.analysis_id(),
            category = error.category(),
            error = %error,
            "DegradedFeature"
        );
    }
}

impl<C: Clock> Clone for RecommendationHandle<C> {
    fn clone(&self) -> Self {
        Self { subscription: self.subscription.clone() }
    }
}

impl<C: Clock> fmt::Debug for RecommendationHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecommendationHandle").field("analysis_id", &self.analysis_id()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use adoptly_common::assert_eventually_async;
    use adoptly_common::resilience::MockClock;
    use adoptly_domain::fixtures::sample_recommendation;
    use adoptly_domain::{
        DashboardData, OpportunityType, SubscribeRequest, SubscribeResponse, TaskStatus,
        UpdateProgressResponse,
    };
    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;
    use crate::ports::FetchResult;

    /// Pops scripted recommendation results, repeating the last one
    struct ScriptedApi {
        calls: AtomicUsize,
        script: Mutex<Vec<FetchResult<RecommendationData>>>,
    }

    impl ScriptedApi {
        fn new(script: Vec<FetchResult<RecommendationData>>) -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0), script: Mutex::new(script) })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DashboardApi for ScriptedApi {
        async fn fetch_dashboard(&self, _id: &AnalysisId) -> FetchResult<DashboardData> {
            Err(FetchError::Config("not used".into()))
        }

        async fn fetch_recommendation(&self, _id: &AnalysisId) -> FetchResult<RecommendationData> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock();
            if script.len() > 1 {
                script.remove(0)
            } else {
                script[0].clone()
            }
        }

        async fn submit_progress_update(
            &self,
            _id: &AnalysisId,
            _opportunity: OpportunityType,
            _status: TaskStatus,
        ) -> FetchResult<UpdateProgressResponse> {
            Err(FetchError::Config("not used".into()))
        }

        async fn subscribe(&self, _request: &SubscribeRequest) -> FetchResult<SubscribeResponse> {
            Err(FetchError::Config("not used".into()))
        }
    }

    fn settings() -> CacheSettings {
        CacheSettings {
            error_retry_count: 0,
            error_retry_interval_ms: 1,
            ..CacheSettings::recommendation()
        }
    }

    fn id() -> Option<AnalysisId> {
        AnalysisId::new("a-1")
    }

    #[tokio::test]
    async fn test_failure_degrades_to_none() {
        let api = ScriptedApi::new(vec![Err(FetchError::Http {
            status: 500,
            message: "boom".into(),
        })]);
        let cache = RecommendationCache::with_clock(api.clone(), &settings(), MockClock::new());
        let handle = cache.subscribe(id());

        assert!(handle.load().await.is_none());
        assert!(handle.view().is_none());
        assert!(!handle.is_loading());
        assert_eq!(api.calls(), 1);
    }

    #[tokio::test]
    async fn test_focus_does_not_revalidate() {
        let clock = MockClock::new();
        let api = ScriptedApi::new(vec![Ok(sample_recommendation(OpportunityType::ValueCreation))]);
        let cache = RecommendationCache::with_clock(api.clone(), &settings(), clock.clone());
        let handle = cache.subscribe(id());
        handle.load().await.unwrap();

        clock.advance(Duration::from_secs(30));
        assert_eq!(cache.notify(RevalidateEvent::Focus).await, 0);
        assert_eq!(cache.notify(RevalidateEvent::Reconnect).await, 1);
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test]
    async fn test_stale_value_served_while_one_refresh_runs() {
        let clock = MockClock::new();
        let api = ScriptedApi::new(vec![
            Ok(sample_recommendation(OpportunityType::ValueCreation)),
            Ok(sample_recommendation(OpportunityType::BusinessManagement)),
        ]);
        let cache = RecommendationCache::with_clock(api.clone(), &settings(), clock.clone());
        let handle = cache.subscribe(id());

        let first = handle.load().await.unwrap();
        assert_eq!(first.next_task.opportunity_type, OpportunityType::ValueCreation);

        clock.advance(Duration::from_secs(61));
        let (a, b) = tokio::join!(handle.load(), handle.load());
        assert!(Arc::ptr_eq(&a.unwrap(), &first));
        assert!(Arc::ptr_eq(&b.unwrap(), &first));

        assert_eventually_async!(Duration::from_secs(1), async {
            handle.view().is_some_and(|data| {
                data.next_task.opportunity_type == OpportunityType::BusinessManagement
            })
        });
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test]
    async fn test_fresh_value_is_not_refetched() {
        let clock = MockClock::new();
        let api = ScriptedApi::new(vec![Ok(sample_recommendation(OpportunityType::ValueCreation))]);
        let cache = RecommendationCache::with_clock(api.clone(), &settings(), clock.clone());
        let handle = cache.subscribe(id());
        handle.load().await.unwrap();

        clock.advance(Duration::from_secs(59));
        handle.load().await.unwrap();
        assert_eq!(api.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_revalidation_keeps_previous_value() {
        let clock = MockClock::new();
        let api = ScriptedApi::new(vec![
            Ok(sample_recommendation(OpportunityType::ValueCreation)),
            Err(FetchError::Transport("offline".into())),
        ]);
        let cache = RecommendationCache::with_clock(api.clone(), &settings(), clock.clone());
        let handle = cache.subscribe(id());
        let first = handle.load().await.unwrap();

        clock.advance(Duration::from_secs(6));
        let after = handle.revalidate().await.unwrap();
        assert!(Arc::ptr_eq(&after, &first));
        assert!(handle.view().is_some());
    }
}

//! Dashboard cache
//!
//! One [`CacheStore`] slot per analysis id. Consumers hold a
//! [`DashboardHandle`] for the analysis they display; dropping the last
//! handle for an id evicts its snapshot.

use std::fmt;
use std::sync::Arc;

use adoptly_common::cache::{CacheState, CacheStats, CacheStore, RevalidateEvent, Subscription};
use adoptly_common::resilience::{Clock, SystemClock};
use adoptly_domain::{AnalysisId, CacheSettings, DashboardData, FetchError};
use tracing::debug;

use crate::ports::DashboardApi;
use crate::settings::cache_config;

/// Store backing the dashboard cache
pub type DashboardStore<C = SystemClock> = CacheStore<AnalysisId, DashboardData, FetchError, C>;

/// Cache state as seen by a dashboard consumer
pub type DashboardState = CacheState<DashboardData, FetchError>;

/// What a dashboard consumer should render
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardView {
    /// No analysis selected
    Inactive,
    /// First fetch still outstanding
    Loading,
    /// Snapshot available, possibly revalidating in the background
    Ready(Arc<DashboardData>),
    /// No snapshot and the last fetch failed
    Failed { error: FetchError, retry_available: bool },
}

impl DashboardView {
    /// Snapshot to render, present only for [`DashboardView::Ready`]
    #[must_use]
    pub fn data(&self) -> Option<&Arc<DashboardData>> {
        match self {
            Self::Ready(data) => Some(data),
            _ => None,
        }
    }
}

impl From<&DashboardState> for DashboardView {
    fn from(state: &DashboardState) -> Self {
        match (&state.data, &state.error) {
            (Some(data), _) => Self::Ready(Arc::clone(data)),
            (None, Some(error)) => Self::Failed { error: error.clone(), retry_available: true },
            (None, None) => Self::Loading,
        }
    }
}

/// Revalidating cache of dashboard snapshots keyed by analysis id
pub struct DashboardCache<C: Clock = SystemClock> {
    store: DashboardStore<C>,
}

impl DashboardCache<SystemClock> {
    /// Create a cache that fetches through `api`
    pub fn new(api: Arc<dyn DashboardApi>, settings: &CacheSettings) -> Self {
        Self::with_clock(api, settings, SystemClock)
    }
}

impl<C: Clock> DashboardCache<C> {
    /// Create a cache on an explicit clock
    pub fn with_clock(api: Arc<dyn DashboardApi>, settings: &CacheSettings, clock: C) -> Self {
        let store = CacheStore::builder("dashboard", move |id: AnalysisId| {
            let api = Arc::clone(&api);
            async move { api.fetch_dashboard(&id).await }
        })
        .config(cache_config(settings))
        .retry_if(FetchError::is_retryable)
        .clock(clock)
        .build();

        Self { store }
    }

    /// Subscribe to an analysis; `None` gives an inactive handle that never
    /// fetches
    #[must_use]
    pub fn subscribe(&self, id: Option<AnalysisId>) -> DashboardHandle<C> {
        DashboardHandle { subscription: self.store.subscribe(id) }
    }

    /// Forward a host focus or reconnect event
    pub async fn notify(&self, event: RevalidateEvent) -> usize {
        self.store.notify(event).await
    }

    /// Underlying store, for inspection
    #[must_use]
    pub fn store(&self) -> &DashboardStore<C> {
        &self.store
    }

    /// Fetch, dedupe and mutation counters
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }
}

impl<C: Clock> Clone for DashboardCache<C> {
    fn clone(&self) -> Self {
        Self { store: self.store.clone() }
    }
}

impl<C: Clock> fmt::Debug for DashboardCache<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardCache").field("store", &self.store).finish()
    }
}

/// A consumer's subscription to one analysis
pub struct DashboardHandle<C: Clock = SystemClock> {
    subscription: Subscription<AnalysisId, DashboardData, FetchError, C>,
}

impl<C: Clock> DashboardHandle<C> {
    /// Analysis this handle follows; `None` for an inactive handle
    #[must_use]
    pub fn analysis_id(&self) -> Option<&AnalysisId> {
        self.subscription.key()
    }

    /// Whether the handle has an analysis to fetch
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.analysis_id().is_some()
    }

    /// Raw cache state: data, error and in-flight flags
    #[must_use]
    pub fn state(&self) -> DashboardState {
        self.subscription.state()
    }

    /// Render state derived from [`Self::state`]
    #[must_use]
    pub fn view(&self) -> DashboardView {
        if !self.is_active() {
            return DashboardView::Inactive;
        }
        DashboardView::from(&self.state())
    }

    /// Cached snapshot, if any, without fetching
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<DashboardData>> {
        self.state().data
    }

    /// Cached snapshot, fetching on a miss
    pub async fn load(&self) -> Result<Option<Arc<DashboardData>>, FetchError> {
        self.subscription.load().await
    }

    /// Fetch again unless a fetch completed inside the dedupe window
    pub async fn revalidate(&self) -> Result<Option<Arc<DashboardData>>, FetchError> {
        self.subscription.revalidate().await
    }

    /// User-triggered retry; always issues a new request
    pub async fn retry(&self) -> Result<Option<Arc<DashboardData>>, FetchError> {
        debug!(analysis_id = ?self.analysis_id(), "Dashboard retry requested");
        self.subscription.refresh().await
    }

    /// Replace the cached snapshot without fetching
    pub fn mutate(&self, data: DashboardData) -> Option<Arc<DashboardData>> {
        self.subscription.mutate(data)
    }

    /// Derive a new snapshot from the cached one without fetching
    pub fn mutate_with<F>(&self, update: F) -> Option<Arc<DashboardData>>
    where
        F: FnOnce(Option<&DashboardData>) -> Option<DashboardData>,
    {
        self.subscription.mutate_with(update)
    }
}

impl<C: Clock> Clone for DashboardHandle<C> {
    fn clone(&self) -> Self {
        Self { subscription: self.subscription.clone() }
    }
}

impl<C: Clock> fmt::Debug for DashboardHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardHandle").field("analysis_id", &self.analysis_id()).finish()
    }
}

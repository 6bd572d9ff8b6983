//! Keyed stale-while-revalidate store
//!
//! A [`CacheStore`] owns one slot per subscribed key. Each slot holds the last
//! good value, the last fetch error and at most one in-flight fetch. Fetches
//! are spawned onto the tokio runtime and shared between every caller that
//! asks for the same key while they run, so a subscriber going away never
//! cancels a request another subscriber is waiting on.
//!
//! Two counters guard against stale writes:
//! - `epoch` is bumped by every local mutation; a fetch that started under an
//!   older epoch is dropped when it lands.
//! - `instance` identifies one subscription lifetime of a key; a fetch that
//!   lands after its slot was evicted (or re-created) is dropped.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;

use futures::future::{join_all, BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::config::CacheConfig;
use super::state::{CacheState, RevalidateEvent};
use super::stats::{CacheStats, MetricsCollector};
use crate::resilience::policies::PredicateRetry;
use crate::resilience::{Clock, RetryError, RetryExecutor, SystemClock};

/// Boxed future returned by a fetcher
pub type FetchFuture<V, E> = BoxFuture<'static, Result<V, E>>;

/// Async function that loads the value for a key
pub type Fetcher<K, V, E> = Arc<dyn Fn(K) -> FetchFuture<V, E> + Send + Sync>;

/// Decides whether a failed fetch is worth another attempt
pub type RetryPredicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

type Outcome<V, E> = Result<Option<Arc<V>>, E>;
type SharedFetch<V, E> = Shared<BoxFuture<'static, Outcome<V, E>>>;

struct InFlight<V, E> {
    started_at: Instant,
    epoch: u64,
    future: SharedFetch<V, E>,
}

impl<V, E> InFlight<V, E> {
    fn is_pending(&self) -> bool {
        self.future.peek().is_none()
    }
}

struct Slot<V, E> {
    instance: u64,
    subscribers: usize,
    data: Option<Arc<V>>,
    error: Option<E>,
    updated_at: Option<Instant>,
    epoch: u64,
    fetch: Option<InFlight<V, E>>,
    last_focus_revalidation: Option<Instant>,
}

impl<V, E> Slot<V, E> {
    fn new(instance: u64) -> Self {
        Self {
            instance,
            subscribers: 0,
            data: None,
            error: None,
            updated_at: None,
            epoch: 0,
            fetch: None,
            last_focus_revalidation: None,
        }
    }

    fn is_fetching(&self) -> bool {
        self.fetch.as_ref().is_some_and(InFlight::is_pending)
    }
}

struct StoreInner<K, V, E, C> {
    name: &'static str,
    config: CacheConfig,
    clock: C,
    fetcher: Fetcher<K, V, E>,
    retry_if: RetryPredicate<E>,
    slots: Mutex<HashMap<K, Slot<V, E>>>,
    metrics: MetricsCollector,
    next_instance: AtomicU64,
}

impl<K, V, E, C> StoreInner<K, V, E, C>
where
    K: Eq + Hash + Clone + fmt::Debug,
    E: Clone + fmt::Debug,
    C: Clock,
{
    /// Apply a finished fetch to its slot, unless the slot moved on
    fn settle(&self, key: &K, instance: u64, epoch: u64, result: Result<V, E>) -> Outcome<V, E> {
        let mut slots = self.slots.lock();

        let Some(slot) = slots.get_mut(key).filter(|slot| slot.instance == instance) else {
            self.metrics.record_discard();
            debug!(cache = self.name, key = ?key, "Discarding fetch result for unsubscribed key");
            return result.map(|value| Some(Arc::new(value)));
        };

        if slot.epoch != epoch {
            self.metrics.record_discard();
            debug!(
                cache = self.name,
                key = ?key,
                "Discarding fetch result superseded by local mutation"
            );
            return Ok(slot.data.clone());
        }

        match result {
            Ok(value) => {
                let data = Arc::new(value);
                slot.data = Some(Arc::clone(&data));
                slot.error = None;
                slot.updated_at = Some(self.clock.now());
                debug!(cache = self.name, key = ?key, "Cache entry revalidated");
                Ok(Some(data))
            }
            Err(error) => {
                warn!(
                    cache = self.name,
                    key = ?key,
                    error = ?error,
                    has_data = slot.data.is_some(),
                    "Fetch failed after retries"
                );
                slot.error = Some(error.clone());
                Err(error)
            }
        }
    }

    fn is_stale(&self, slot: &Slot<V, E>, now: Instant) -> bool {
        self.config.stale_after.is_some_and(|age| {
            slot.updated_at.map_or(true, |at| now.saturating_duration_since(at) >= age)
        })
    }
}

/// Keyed revalidating cache with request dedupe and subscriber refcounts
///
/// Cloning is cheap and every clone shares the same slots.
pub struct CacheStore<K, V, E, C = SystemClock> {
    inner: Arc<StoreInner<K, V, E, C>>,
}

impl<K, V, E, C> Clone for CacheStore<K, V, E, C> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<K, V, E, C> fmt::Debug for CacheStore<K, V, E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("name", &self.inner.name)
            .field("config", &self.inner.config)
            .field("keys", &self.inner.slots.lock().len())
            .finish_non_exhaustive()
    }
}

impl<K, V, E> CacheStore<K, V, E, SystemClock>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
    E: Clone + fmt::Debug + Send + Sync + 'static,
{
    /// Create a store on the system clock that retries every error
    pub fn new<F, Fut>(name: &'static str, config: CacheConfig, fetcher: F) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        Self::builder(name, fetcher).config(config).build()
    }

    /// Start building a store around `fetcher`
    pub fn builder<F, Fut>(name: &'static str, fetcher: F) -> CacheStoreBuilder<K, V, E>
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        CacheStoreBuilder {
            name,
            config: CacheConfig::default(),
            clock: SystemClock,
            fetcher: Arc::new(move |key: K| fetcher(key).boxed()),
            retry_if: Arc::new(|_: &E| true),
        }
    }
}

impl<K, V, E, C> CacheStore<K, V, E, C>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
    E: Clone + fmt::Debug + Send + Sync + 'static,
    C: Clock,
{
    /// Name used in log fields
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Configuration in effect for this store
    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Number of subscribed keys
    pub fn len(&self) -> usize {
        self.inner.slots.lock().len()
    }

    /// True when nothing is subscribed
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current data for `key` without touching subscriptions or metrics
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        self.inner.slots.lock().get(key).and_then(|slot| slot.data.clone())
    }

    /// Snapshot of the store counters
    pub fn stats(&self) -> CacheStats {
        self.inner.metrics.snapshot(self.len())
    }

    /// Subscribe to `key`; `None` yields an inactive subscription that never
    /// fetches
    ///
    /// Subscribing to a key without data starts its first fetch when called
    /// inside a tokio runtime. Outside one, the fetch starts on the first
    /// [`Subscription::load`].
    pub fn subscribe(&self, key: Option<K>) -> Subscription<K, V, E, C> {
        if let Some(key) = &key {
            let needs_fetch = {
                let mut slots = self.inner.slots.lock();
                let slot = slots.entry(key.clone()).or_insert_with(|| {
                    Slot::new(self.inner.next_instance.fetch_add(1, Ordering::Relaxed))
                });
                slot.subscribers += 1;
                slot.data.is_none()
            };

            if needs_fetch
                && tokio::runtime::Handle::try_current().is_ok()
                && self.begin(key, false).is_some()
            {
                debug!(cache = self.inner.name, key = ?key, "Initial fetch started on subscribe");
            }
        }

        Subscription { store: self.clone(), key }
    }

    /// Revalidate every subscribed key affected by `event`
    ///
    /// Returns the number of keys whose fetch was awaited. Keys inside the
    /// dedupe window or the focus throttle are skipped.
    pub async fn notify(&self, event: RevalidateEvent) -> usize {
        let config = &self.inner.config;
        let enabled = match event {
            RevalidateEvent::Focus => config.revalidate_on_focus,
            RevalidateEvent::Reconnect => config.revalidate_on_reconnect,
        };
        if !enabled {
            return 0;
        }

        let now = self.inner.clock.now();
        let keys: Vec<K> = {
            let slots = self.inner.slots.lock();
            slots
                .iter()
                .filter(|(_, slot)| {
                    event != RevalidateEvent::Focus
                        || !slot.last_focus_revalidation.is_some_and(|last| {
                            now.saturating_duration_since(last) < config.focus_throttle_interval
                        })
                })
                .map(|(key, _)| key.clone())
                .collect()
        };

        let mut fetches = Vec::with_capacity(keys.len());
        for key in &keys {
            let Some(fetch) = self.begin(key, false) else {
                continue;
            };
            // Only a focus event that actually revalidated starts the throttle
            if event == RevalidateEvent::Focus {
                if let Some(slot) = self.inner.slots.lock().get_mut(key) {
                    slot.last_focus_revalidation = Some(now);
                }
            }
            fetches.push(fetch);
        }
        let count = fetches.len();
        debug!(cache = self.inner.name, ?event, revalidating = count, "Revalidation event");
        join_all(fetches).await;
        count
    }

    /// Start or join a fetch for `key`
    ///
    /// Returns `None` when a fetch completed inside the dedupe window and
    /// `force` is false; callers then read the slot as it stands.
    fn begin(&self, key: &K, force: bool) -> Option<SharedFetch<V, E>> {
        let inner = &self.inner;
        let now = inner.clock.now();
        let mut slots = inner.slots.lock();
        let slot = slots.get_mut(key)?;

        if let Some(inflight) = &slot.fetch {
            if inflight.is_pending() && (!force || inflight.epoch == slot.epoch) {
                inner.metrics.record_dedupe();
                return Some(inflight.future.clone());
            }
            let recent =
                now.saturating_duration_since(inflight.started_at) < inner.config.dedupe_interval;
            if !inflight.is_pending() && !force && recent {
                inner.metrics.record_dedupe();
                return None;
            }
        }

        let future = self.fetch_future(key.clone(), slot.instance, slot.epoch);
        slot.fetch = Some(InFlight { started_at: now, epoch: slot.epoch, future: future.clone() });
        drop(slots);

        inner.metrics.record_fetch();
        debug!(cache = inner.name, key = ?key, force, "Fetch started");
        tokio::spawn(future.clone());
        Some(future)
    }

    fn fetch_future(&self, key: K, instance: u64, epoch: u64) -> SharedFetch<V, E> {
        let store: Weak<StoreInner<K, V, E, C>> = Arc::downgrade(&self.inner);
        let fetcher = Arc::clone(&self.inner.fetcher);
        let retry_if = Arc::clone(&self.inner.retry_if);
        let executor = RetryExecutor::new(
            self.inner.config.retry_config(),
            PredicateRetry::new(move |error: &E, _attempt: u32| retry_if(error)),
        );

        async move {
            let result = executor
                .execute(|| fetcher(key.clone()))
                .await
                .map_err(RetryError::into_inner);

            match store.upgrade() {
                Some(inner) => inner.settle(&key, instance, epoch, result),
                None => result.map(|value| Some(Arc::new(value))),
            }
        }
        .boxed()
        .shared()
    }

    async fn await_fetch(&self, key: &K, force: bool) -> Outcome<V, E> {
        match self.begin(key, force) {
            Some(fetch) => fetch.await,
            None => self.current(key),
        }
    }

    fn current(&self, key: &K) -> Outcome<V, E> {
        let slots = self.inner.slots.lock();
        match slots.get(key) {
            Some(Slot { data: None, error: Some(error), .. }) => Err(error.clone()),
            Some(slot) => Ok(slot.data.clone()),
            None => Ok(None),
        }
    }

    fn retain(&self, key: &K) {
        if let Some(slot) = self.inner.slots.lock().get_mut(key) {
            slot.subscribers += 1;
        }
    }

    fn release(&self, key: &K) {
        let mut slots = self.inner.slots.lock();
        let evict = slots.get_mut(key).is_some_and(|slot| {
            slot.subscribers = slot.subscribers.saturating_sub(1);
            slot.subscribers == 0
        });
        if evict {
            slots.remove(key);
            self.inner.metrics.record_eviction();
            debug!(cache = self.inner.name, key = ?key, "Evicted entry after last unsubscribe");
        }
    }
}

/// Builder for [`CacheStore`]
pub struct CacheStoreBuilder<K, V, E, C = SystemClock> {
    name: &'static str,
    config: CacheConfig,
    clock: C,
    fetcher: Fetcher<K, V, E>,
    retry_if: RetryPredicate<E>,
}

impl<K, V, E, C> CacheStoreBuilder<K, V, E, C> {
    /// Replace the default configuration
    pub fn config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Only retry errors for which `predicate` returns true
    pub fn retry_if<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.retry_if = Arc::new(predicate);
        self
    }

    /// Use a different clock (tests pass a `MockClock`)
    pub fn clock<C2: Clock>(self, clock: C2) -> CacheStoreBuilder<K, V, E, C2> {
        CacheStoreBuilder {
            name: self.name,
            config: self.config,
            clock,
            fetcher: self.fetcher,
            retry_if: self.retry_if,
        }
    }

    /// Build the store
    pub fn build(self) -> CacheStore<K, V, E, C> {
        CacheStore {
            inner: Arc::new(StoreInner {
                name: self.name,
                config: self.config,
                clock: self.clock,
                fetcher: self.fetcher,
                retry_if: self.retry_if,
                slots: Mutex::new(HashMap::new()),
                metrics: MetricsCollector::new(),
                next_instance: AtomicU64::new(1),
            }),
        }
    }
}

/// A subscriber's handle on one key of a [`CacheStore`]
///
/// Dropping the last subscription for a key evicts its slot. Fetches already
/// running are left to finish and their results are discarded.
pub struct Subscription<K, V, E, C = SystemClock>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
    E: Clone + fmt::Debug + Send + Sync + 'static,
    C: Clock,
{
    store: CacheStore<K, V, E, C>,
    key: Option<K>,
}

impl<K, V, E, C> Subscription<K, V, E, C>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
    E: Clone + fmt::Debug + Send + Sync + 'static,
    C: Clock,
{
    /// Key this subscription watches, `None` when inactive
    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    /// Store this subscription belongs to
    pub fn store(&self) -> &CacheStore<K, V, E, C> {
        &self.store
    }

    /// Current state of the entry
    pub fn state(&self) -> CacheState<V, E> {
        let Some(key) = &self.key else {
            return CacheState::default();
        };
        let slots = self.store.inner.slots.lock();
        let Some(slot) = slots.get(key) else {
            return CacheState::default();
        };

        let is_validating = slot.is_fetching();
        CacheState {
            data: slot.data.clone(),
            error: slot.error.clone(),
            is_loading: slot.data.is_none() && slot.error.is_none(),
            is_validating,
        }
    }

    /// Read the entry, fetching when there is no data yet
    ///
    /// Data older than `stale_after` is returned immediately while a
    /// background revalidation runs.
    pub async fn load(&self) -> Result<Option<Arc<V>>, E> {
        let Some(key) = &self.key else {
            return Ok(None);
        };
        let inner = &self.store.inner;

        let cached = {
            let now = inner.clock.now();
            let slots = inner.slots.lock();
            slots
                .get(key)
                .and_then(|slot| slot.data.clone().map(|data| (data, inner.is_stale(slot, now))))
        };

        if let Some((data, stale)) = cached {
            inner.metrics.record_hit();
            if stale && self.store.begin(key, false).is_some() {
                debug!(cache = inner.name, key = ?key, "Serving stale data while revalidating");
            }
            return Ok(Some(data));
        }

        inner.metrics.record_miss();
        self.store.await_fetch(key, false).await
    }

    /// Fetch again unless a fetch completed inside the dedupe window
    pub async fn revalidate(&self) -> Result<Option<Arc<V>>, E> {
        match &self.key {
            Some(key) => self.store.await_fetch(key, false).await,
            None => Ok(None),
        }
    }

    /// Fetch again, ignoring the dedupe window
    pub async fn refresh(&self) -> Result<Option<Arc<V>>, E> {
        match &self.key {
            Some(key) => self.store.await_fetch(key, true).await,
            None => Ok(None),
        }
    }

    /// Replace the cached value without fetching
    pub fn mutate(&self, value: V) -> Option<Arc<V>> {
        self.mutate_with(|_| Some(value))
    }

    /// Derive a new cached value from the current one without fetching
    ///
    /// Returning `None` from `update` leaves the entry untouched. The closure
    /// runs under the store lock and must not call back into the store. Any
    /// fetch in flight when the mutation lands has its result discarded.
    pub fn mutate_with<F>(&self, update: F) -> Option<Arc<V>>
    where
        F: FnOnce(Option<&V>) -> Option<V>,
    {
        let key = self.key.as_ref()?;
        let inner = &self.store.inner;

        let next = {
            let mut slots = inner.slots.lock();
            let slot = slots.get_mut(key)?;
            let next = Arc::new(update(slot.data.as_deref())?);
            slot.data = Some(Arc::clone(&next));
            slot.error = None;
            slot.epoch += 1;
            slot.updated_at = Some(inner.clock.now());
            next
        };

        inner.metrics.record_mutation();
        debug!(cache = inner.name, key = ?key, "Applied local mutation");
        Some(next)
    }
}

impl<K, V, E, C> Clone for Subscription<K, V, E, C>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
    E: Clone + fmt::Debug + Send + Sync + 'static,
    C: Clock,
{
    fn clone(&self) -> Self {
        if let Some(key) = &self.key {
            self.store.retain(key);
        }
        Self { store: self.store.clone(), key: self.key.clone() }
    }
}

impl<K, V, E, C> Drop for Subscription<K, V, E, C>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
    E: Clone + fmt::Debug + Send + Sync + 'static,
    C: Clock,
{
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.store.release(&key);
        }
    }
}

impl<K, V, E, C> fmt::Debug for Subscription<K, V, E, C>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
    E: Clone + fmt::Debug + Send + Sync + 'static,
    C: Clock,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("cache", &self.store.inner.name)
            .field("key", &self.key)
            .finish()
    }
}

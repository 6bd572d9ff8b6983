//! Cache configuration types and builder patterns
//!
//! Controls how a [`CacheStore`](super::CacheStore) revalidates its entries:
//! request dedupe, error retry, event-driven revalidation and age-based
//! staleness.

use std::time::Duration;

use crate::resilience::RetryConfig;

/// Default window in which identical requests collapse into one fetch
pub const DEFAULT_DEDUPE_INTERVAL: Duration = Duration::from_secs(5);
/// Default number of retries after a failed fetch
pub const DEFAULT_ERROR_RETRY_COUNT: u32 = 3;
/// Default fixed delay between fetch retries
pub const DEFAULT_ERROR_RETRY_INTERVAL: Duration = Duration::from_secs(1);
/// Default minimum spacing between two focus-triggered revalidations of a key
pub const DEFAULT_FOCUS_THROTTLE_INTERVAL: Duration = Duration::from_secs(5);

/// Configuration for cache revalidation behavior
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Requests for a key started within this window share one fetch
    pub dedupe_interval: Duration,

    /// Retries after a failed fetch before the error is surfaced
    pub error_retry_count: u32,

    /// Fixed delay between retries
    pub error_retry_interval: Duration,

    /// Revalidate subscribed keys when the host regains focus
    pub revalidate_on_focus: bool,

    /// Revalidate subscribed keys when connectivity is restored
    pub revalidate_on_reconnect: bool,

    /// Minimum spacing between focus revalidations of the same key
    pub focus_throttle_interval: Duration,

    /// Age after which cached data is served stale and refreshed in the
    /// background (None = never stale by age)
    pub stale_after: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dedupe_interval: DEFAULT_DEDUPE_INTERVAL,
            error_retry_count: DEFAULT_ERROR_RETRY_COUNT,
            error_retry_interval: DEFAULT_ERROR_RETRY_INTERVAL,
            revalidate_on_focus: true,
            revalidate_on_reconnect: true,
            focus_throttle_interval: DEFAULT_FOCUS_THROTTLE_INTERVAL,
            stale_after: None,
        }
    }
}

impl CacheConfig {
    /// Create a new configuration builder
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Retry configuration derived from the error retry settings
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::fixed(self.error_retry_count, self.error_retry_interval)
    }
}

/// Builder for CacheConfig with fluent API
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dedupe window
    pub fn dedupe_interval(mut self, interval: Duration) -> Self {
        self.config.dedupe_interval = interval;
        self
    }

    /// Set retry count and fixed retry delay
    pub fn error_retry(mut self, count: u32, interval: Duration) -> Self {
        self.config.error_retry_count = count;
        self.config.error_retry_interval = interval;
        self
    }

    /// Enable or disable focus revalidation
    pub fn revalidate_on_focus(mut self, enabled: bool) -> Self {
        self.config.revalidate_on_focus = enabled;
        self
    }

    /// Enable or disable reconnect revalidation
    pub fn revalidate_on_reconnect(mut self, enabled: bool) -> Self {
        self.config.revalidate_on_reconnect = enabled;
        self
    }

    /// Set the focus throttle interval
    pub fn focus_throttle_interval(mut self, interval: Duration) -> Self {
        self.config.focus_throttle_interval = interval;
        self
    }

    /// Serve data older than `age` stale and refresh it in the background
    pub fn stale_after(mut self, age: Duration) -> Self {
        self.config.stale_after = Some(age);
        self
    }

    /// Build the configuration
    pub fn build(self) -> CacheConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cache::config.
    use super::*;

    /// Validates `CacheConfig::default` behavior for the cache config default
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms the dedupe window is five seconds.
    /// - Confirms three retries one second apart.
    /// - Ensures both event triggers are enabled and data never goes stale.
    #[test]
    fn test_cache_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.dedupe_interval, Duration::from_secs(5));
        assert_eq!(config.error_retry_count, 3);
        assert_eq!(config.error_retry_interval, Duration::from_secs(1));
        assert!(config.revalidate_on_focus);
        assert!(config.revalidate_on_reconnect);
        assert!(config.stale_after.is_none());
    }

    /// Validates `CacheConfig::builder` behavior for the builder overrides
    /// scenario.
    #[test]
    fn test_builder_overrides() {
        let config = CacheConfig::builder()
            .dedupe_interval(Duration::from_millis(10))
            .error_retry(1, Duration::from_millis(2))
            .revalidate_on_focus(false)
            .stale_after(Duration::from_secs(60))
            .build();

        assert_eq!(config.dedupe_interval, Duration::from_millis(10));
        assert_eq!(config.error_retry_count, 1);
        assert!(!config.revalidate_on_focus);
        assert!(config.revalidate_on_reconnect);
        assert_eq!(config.stale_after, Some(Duration::from_secs(60)));
    }

    /// Validates `CacheConfig::retry_config` behavior for the retry mapping
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms three retries map to four attempts one second apart.
    #[test]
    fn test_retry_config_mapping() {
        let retry = CacheConfig::default().retry_config();
        assert_eq!(retry.max_attempts, 4);
        assert_eq!(retry.interval, Duration::from_secs(1));
    }
}

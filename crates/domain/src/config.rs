//! Configuration structures
//!
//! Every field has a serde default so a config file only needs the values it
//! overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_API_TIMEOUT_SECS, DEFAULT_DEDUPE_INTERVAL_MS,
    DEFAULT_ERROR_RETRY_COUNT, DEFAULT_ERROR_RETRY_INTERVAL_MS, DEFAULT_FOCUS_THROTTLE_MS,
    DEFAULT_LOG_FILTER, RECOMMENDATION_STALE_AFTER_MS,
};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub dashboard_cache: CacheSettings,
    pub recommendation_cache: CacheSettings,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            dashboard_cache: CacheSettings::dashboard(),
            recommendation_cache: CacheSettings::recommendation(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Backend connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_API_BASE_URL.to_owned(), timeout_secs: DEFAULT_API_TIMEOUT_SECS }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Revalidation settings for one cache
///
/// Fields left out of a config file fall back to the dashboard preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub dedupe_interval_ms: u64,
    pub error_retry_count: u32,
    pub error_retry_interval_ms: u64,
    pub revalidate_on_focus: bool,
    pub revalidate_on_reconnect: bool,
    pub focus_throttle_ms: u64,
    /// Age after which data is refreshed in the background
    pub stale_after_ms: Option<u64>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self::dashboard()
    }
}

impl CacheSettings {
    /// Dashboard preset: focus and reconnect revalidation, never stale by age
    pub fn dashboard() -> Self {
        Self {
            dedupe_interval_ms: DEFAULT_DEDUPE_INTERVAL_MS,
            error_retry_count: DEFAULT_ERROR_RETRY_COUNT,
            error_retry_interval_ms: DEFAULT_ERROR_RETRY_INTERVAL_MS,
            revalidate_on_focus: true,
            revalidate_on_reconnect: true,
            focus_throttle_ms: DEFAULT_FOCUS_THROTTLE_MS,
            stale_after_ms: None,
        }
    }

    /// Recommendation preset: no focus revalidation, stale after 60 seconds
    pub fn recommendation() -> Self {
        Self {
            revalidate_on_focus: false,
            stale_after_ms: Some(RECOMMENDATION_STALE_AFTER_MS),
            ..Self::dashboard()
        }
    }

    pub fn dedupe_interval(&self) -> Duration {
        Duration::from_millis(self.dedupe_interval_ms)
    }

    pub fn error_retry_interval(&self) -> Duration {
        Duration::from_millis(self.error_retry_interval_ms)
    }

    pub fn focus_throttle(&self) -> Duration {
        Duration::from_millis(self.focus_throttle_ms)
    }

    pub fn stale_after(&self) -> Option<Duration> {
        self.stale_after_ms.map(Duration::from_millis)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

crate::impl_domain_status_conversions!(LogFormat {
    Plain => "plain",
    Json => "json",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { format: LogFormat::Plain, filter: DEFAULT_LOG_FILTER.to_owned() }
    }
}

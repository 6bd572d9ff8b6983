//! Domain constants
//!
//! Defaults for the backend connection and the two caches, plus the fixed
//! shape of an analysis.

// Backend
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;
pub const USER_AGENT: &str = concat!("adoptly/", env!("CARGO_PKG_VERSION"));

// Analysis shape
pub const GAP_COUNT: usize = 3;
pub const MIN_COMPLEXITY: u8 = 1;
pub const MAX_COMPLEXITY: u8 = 10;
pub const MAX_PRIORITY_SCORE: f64 = 10.0;

// Dashboard cache
pub const DEFAULT_DEDUPE_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_ERROR_RETRY_COUNT: u32 = 3;
pub const DEFAULT_ERROR_RETRY_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_FOCUS_THROTTLE_MS: u64 = 5_000;

// Recommendation cache
pub const RECOMMENDATION_STALE_AFTER_MS: u64 = 60_000;

// Logging
pub const DEFAULT_LOG_FILTER: &str = "adoptly=info";

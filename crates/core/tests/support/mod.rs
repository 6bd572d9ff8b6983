//! Shared test helpers for `adoptly-core` integration tests.
//!
//! Each test binary compiles this module separately, so not every helper is
//! used by every binary.

#![allow(dead_code)]

pub mod api;

use std::time::Duration;

use adoptly_domain::{AnalysisId, CacheSettings};

/// Dashboard settings with retries disabled
pub fn no_retry(settings: CacheSettings) -> CacheSettings {
    CacheSettings { error_retry_count: 0, error_retry_interval_ms: 1, ..settings }
}

/// Dashboard settings with fast retries
pub fn fast_retry(count: u32) -> CacheSettings {
    CacheSettings {
        error_retry_count: count,
        error_retry_interval_ms: 1,
        ..CacheSettings::dashboard()
    }
}

pub fn analysis(raw: &str) -> Option<AnalysisId> {
    AnalysisId::new(raw)
}

pub const WAIT: Duration = Duration::from_secs(1);

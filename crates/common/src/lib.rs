//! Modular common utilities shared across Adoptly crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: clock abstraction and retry configuration
//! - `runtime`: async infrastructure (revalidating cache store, retry executor)
//! - `observability`: tracing (pulled in by `runtime`)
//! - `test-utils`: async test helpers

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod resilience;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod cache;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "runtime", feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use cache::{CacheConfig, CacheState, CacheStats, CacheStore, RevalidateEvent, Subscription};
#[cfg(feature = "foundation")]
pub use resilience::{Clock, MockClock, RetryConfig, SystemClock};
#[cfg(feature = "runtime")]
pub use resilience::{policies, RetryError, RetryExecutor, RetryPolicy, RetryResult};

//! Resilience primitives for the sync layer
//!
//! - **Clock**: monotonic time abstraction with a [`MockClock`] for tests
//! - **Retry**: fixed-interval retry executor with a predicate policy;
//!   failed revalidations in the cache store run through it
//!
//! These are generic over the error type so the cache store can keep the
//! caller's typed fetch error across retries.

pub mod clock;
pub mod retry;

// Re-export clock types
pub use clock::{Clock, MockClock, SystemClock};
// Re-export retry types
pub use retry::{policies, RetryConfig, RetryError, RetryPolicy, RetryResult};
#[cfg(feature = "runtime")]
pub use retry::RetryExecutor;

//! Testing utilities and helpers
//!
//! - **[`async_utils`]**: waiting on effects of spawned tasks
//! - deterministic clocks re-exported from [`crate::resilience`]
//!
//! ```rust
//! use std::time::Duration;
//!
//! use adoptly_common::testing::{Clock, MockClock};
//!
//! let clock = MockClock::new();
//! let before = clock.now();
//! clock.advance(Duration::from_secs(5));
//! assert_eq!(clock.now() - before, Duration::from_secs(5));
//! ```

pub mod async_utils;

// `assert_eventually_async!` is exported at the crate root

pub use crate::resilience::{Clock, MockClock, SystemClock};

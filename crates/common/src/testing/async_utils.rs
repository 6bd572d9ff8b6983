//! Async testing utilities
//!
//! Cache fetches run on spawned tasks, so tests usually wait for an effect to
//! land rather than for a specific future.

#![allow(clippy::missing_panics_doc)]

/// Assert that an async condition becomes true within a timeout
///
/// The second argument is re-evaluated on every poll, so pass an `async`
/// block rather than a future bound to a variable.
///
/// # Examples
///
/// ```no_run
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// #[tokio::test]
/// async fn background_fetch_lands() {
///     let done = Arc::new(AtomicBool::new(false));
///     let flag = Arc::clone(&done);
///     tokio::spawn(async move { flag.store(true, Ordering::SeqCst) });
///
///     adoptly_common::assert_eventually_async!(Duration::from_secs(1), async {
///         done.load(Ordering::SeqCst)
///     });
/// }
/// ```
#[macro_export]
macro_rules! assert_eventually_async {
    ($timeout:expr, $fut:expr) => {{
        let timeout_duration = $timeout;
        let result = tokio::time::timeout(timeout_duration, async {
            loop {
                if $fut.await {
                    break;
                }
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        })
        .await;

        assert!(result.is_ok(), "Condition did not become true within {:?}", timeout_duration);
    }};
}

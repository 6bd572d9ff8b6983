//! Generic retry strategy implementation
//!
//! Runs an async operation up to a fixed number of attempts with a fixed
//! pause in between. A [`RetryPolicy`] decides which errors are worth
//! another attempt.
//!
//! Unlike a bare "attempts exhausted" signal, the executor always hands the
//! last operation error back to the caller so that typed errors (HTTP status,
//! transport failure) survive the retry loop.

#[cfg(feature = "runtime")]
use std::fmt;
#[cfg(feature = "runtime")]
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
#[cfg(feature = "runtime")]
use tracing::{debug, instrument, warn};

/// Errors that can occur during retry operations
#[derive(Debug, Clone, Error)]
pub enum RetryError<E> {
    /// All retry attempts have been exhausted
    #[error("All retry attempts exhausted after {attempts} tries: {last}")]
    AttemptsExhausted { attempts: u32, last: E },

    /// The operation failed with a non-retryable error
    #[error("Operation failed with non-retryable error after {attempts} tries: {error}")]
    NonRetryable { attempts: u32, error: E },
}

impl<E> RetryError<E> {
    /// Number of attempts made before giving up
    pub fn attempts(&self) -> u32 {
        match self {
            Self::AttemptsExhausted { attempts, .. } | Self::NonRetryable { attempts, .. } => {
                *attempts
            }
        }
    }

    /// Consume the error and return the last operation error
    pub fn into_inner(self) -> E {
        match self {
            Self::AttemptsExhausted { last, .. } => last,
            Self::NonRetryable { error, .. } => error,
        }
    }
}

/// Result type for retry operations
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// True when the failed `attempt` (0-based) should be followed by another
    fn should_retry(&self, error: &E, attempt: u32) -> bool;
}

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Pause between a failed attempt and the next one
    pub interval: Duration,
}

impl RetryConfig {
    /// Configuration that retries `retries` times after the first failure,
    /// waiting `interval` between attempts.
    pub fn fixed(retries: u32, interval: Duration) -> Self {
        Self { max_attempts: retries.saturating_add(1), interval }
    }
}

/// The main retry executor
#[cfg(feature = "runtime")]
#[derive(Debug, Clone)]
pub struct RetryExecutor<P> {
    config: RetryConfig,
    policy: P,
}

#[cfg(feature = "runtime")]
impl<P> RetryExecutor<P> {
    /// Create a new retry executor with the given configuration and policy
    ///
    /// A zero `max_attempts` is treated as a single attempt.
    pub fn new(config: RetryConfig, policy: P) -> Self {
        let config = RetryConfig { max_attempts: config.max_attempts.max(1), ..config };
        Self { config, policy }
    }

    /// Configuration in effect for this executor
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Execute an operation with retry logic
    #[instrument(skip(self, operation), fields(max_attempts = self.config.max_attempts))]
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> RetryResult<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt: u32 = 0;

        loop {
            let attempt_number = attempt + 1;
            debug!("Executing operation (attempt {}/{})", attempt_number, self.config.max_attempts);

            let error = match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!("Operation succeeded after {} retries", attempt);
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            if attempt_number >= self.config.max_attempts {
                warn!(
                    "All retry attempts exhausted after {} tries, last error: {:?}",
                    attempt_number, error
                );
                return Err(RetryError::AttemptsExhausted { attempts: attempt_number, last: error });
            }

            if !self.policy.should_retry(&error, attempt) {
                debug!("Retry policy determined not to retry: {:?}", error);
                return Err(RetryError::NonRetryable { attempts: attempt_number, error });
            }

            let delay = self.config.interval;
            warn!("Operation failed (attempt {}), retrying after {:?}", attempt_number, delay);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            attempt += 1;
        }
    }
}

/// Pre-defined retry policies
pub mod policies {
    use super::RetryPolicy;

    /// Predicate-based retry policy
    #[derive(Debug, Clone)]
    pub struct PredicateRetry<F> {
        predicate: F,
    }

    impl<F> PredicateRetry<F> {
        pub fn new(predicate: F) -> Self {
            Self { predicate }
        }
    }

    impl<F, E> RetryPolicy<E> for PredicateRetry<F>
    where
        F: Fn(&E, u32) -> bool,
    {
        fn should_retry(&self, error: &E, attempt: u32) -> bool {
            (self.predicate)(error, attempt)
        }
    }
}

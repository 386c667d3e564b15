//! Retry logic with exponential backoff
//!
//! This module provides configurable, cancellable retry logic for transient failures.
//! The delay before retry `n` is `initial_delay * backoff_multiplier^(n-1)`, capped at
//! `max_delay`, with optional jitter to prevent thundering herd.
//!
//! # Example
//!
//! ```no_run
//! use webpage_dl::retry::{IsRetryable, download_with_retry};
//! use webpage_dl::config::RetryConfig;
//! use tokio_util::sync::CancellationToken;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Transient,
//!     Permanent,
//! }
//!
//! impl std::fmt::Display for MyError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{:?}", self)
//!     }
//! }
//!
//! impl IsRetryable for MyError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, MyError::Transient)
//!     }
//! }
//!
//! # async fn example() {
//! let config = RetryConfig::default();
//! let cancel = CancellationToken::new();
//! let result = download_with_retry(&config, &cancel, || async {
//!     Ok::<_, MyError>(())
//! }).await;
//! # }
//! ```

use crate::config::RetryConfig;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (network timeouts, server errors, connection reset) should return `true`.
/// Permanent failures (client errors, local storage failures) should return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

/// Why a retried operation gave up
#[derive(Debug)]
pub enum RetryError<E> {
    /// The cancellation token fired before an attempt completed
    Cancelled,
    /// The operation failed with a non-retryable error
    Permanent(E),
    /// Every attempt failed with a retryable error; `last` is the final cause
    Exhausted {
        /// Total attempts made (initial attempt plus retries)
        attempts: u32,
        /// Error from the final attempt
        last: E,
    },
}

/// Execute an async operation with exponential backoff retry logic
///
/// Makes at most `config.max_attempts + 1` attempts. Cancellation is checked before
/// every attempt, raced against the in-flight attempt, and raced against the backoff
/// sleep, so a cancel stops retries immediately.
pub async fn download_with_retry<F, Fut, T, E>(
    config: &RetryConfig,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        if cancel.is_cancelled() {
            return Err(RetryError::Cancelled);
        }

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RetryError::Cancelled),
            outcome = operation() => outcome,
        };

        match outcome {
            Ok(result) => {
                if attempt > 0 {
                    tracing::info!(attempts = attempt + 1, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt < config.max_attempts => {
                attempt += 1;

                let wait = if config.jitter {
                    add_jitter(delay)
                } else {
                    delay
                };

                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = wait.as_millis(),
                    "Operation failed, retrying"
                );

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(RetryError::Cancelled),
                    _ = tokio::time::sleep(wait) => {}
                }

                let next_delay =
                    Duration::from_secs_f64(delay.as_secs_f64() * config.backoff_multiplier);
                delay = next_delay.min(config.max_delay);
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!(
                        error = %e,
                        attempts = attempt + 1,
                        "Operation failed after all retry attempts exhausted"
                    );
                    return Err(RetryError::Exhausted {
                        attempts: attempt + 1,
                        last: e,
                    });
                }
                tracing::error!(error = %e, "Operation failed with non-retryable error");
                return Err(RetryError::Permanent(e));
            }
        }
    }
}

/// Add random jitter to a delay to prevent thundering herd
///
/// The result lies between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    let jittered_secs = delay.as_secs_f64() * (1.0 + jitter_factor);
    Duration::from_secs_f64(jittered_secs)
}

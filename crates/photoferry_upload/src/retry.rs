//! Bounded retry with exponential backoff.

use photoferry_error::{PhotoferryResult, RetryableError};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tracing::warn;

fn default_max_retries() -> usize {
    3
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_secs() -> u64 {
    30
}

/// How often and how patiently transient failures are retried.
///
/// Only errors whose [`RetryableError::is_retryable`] is true are retried.
/// Decode, encode and rejection errors fail on the first attempt.
///
/// # Examples
///
/// ```
/// use photoferry_upload::RetryPolicy;
///
/// let policy = RetryPolicy::builder().max_retries(5usize).build().unwrap();
/// assert_eq!(*policy.max_retries(), 5);
/// assert_eq!(*policy.initial_backoff_ms(), 500);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(
    default,
    setter(into),
    build_fn(error = "photoferry_error::BuilderError")
)]
pub struct RetryPolicy {
    /// Attempts after the first
    #[serde(default = "default_max_retries")]
    max_retries: usize,

    /// Delay before the first retry, in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    initial_backoff_ms: u64,

    /// Upper bound for any single delay, in seconds
    #[serde(default = "default_max_backoff_secs")]
    max_backoff_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_secs: default_max_backoff_secs(),
        }
    }
}

impl RetryPolicy {
    /// Start a builder.
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delays before each retry, doubling from the initial delay.
    pub fn delays(&self) -> Vec<Duration> {
        ExponentialBackoff::from_millis(2)
            .factor((self.initial_backoff_ms / 2).max(1))
            .max_delay(Duration::from_secs(self.max_backoff_secs))
            .map(jitter)
            .take(self.max_retries)
            .collect()
    }

    /// Run `operation` until it succeeds, fails permanently, or retries run out.
    ///
    /// # Errors
    ///
    /// Returns the last error seen.
    pub async fn run<F, Fut, T>(&self, label: &str, operation: F) -> PhotoferryResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = PhotoferryResult<T>>,
    {
        let operation = &operation;
        Retry::spawn(self.delays(), move || async move {
            match operation().await {
                Ok(value) => Ok(value),
                Err(e) if e.is_retryable() => {
                    warn!(operation = label, error = %e, "Transient error, will retry");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) => Err(RetryError::Permanent(e)),
            }
        })
        .await
    }
}

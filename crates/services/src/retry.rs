//! Bounded retry with exponential backoff for store and auth round-trips.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable as _};
use homebase_config::RetrySettings;
use homebase_db::StoreError;
use tracing::{debug, warn};

use crate::dao::DaoError;

/// Errors that know whether another attempt could succeed.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for StoreError {
    fn is_retryable(&self) -> bool {
        StoreError::is_retryable(self)
    }
}

impl Retryable for DaoError {
    fn is_retryable(&self) -> bool {
        DaoError::is_retryable(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
    /// Any value above zero adds random jitter to each delay.
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
            multiplier: 2.0,
            jitter: 0.1,
        }
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            initial_backoff: Duration::from_millis(settings.base_delay_ms),
            max_backoff: Duration::from_millis(settings.max_delay_ms),
            multiplier: settings.multiplier,
            jitter: settings.jitter,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Delay schedule handed to backon. `max_attempts` counts the first
    /// try, backon counts retries only.
    pub fn backoff(&self) -> ExponentialBuilder {
        let retries = self.max_attempts.max(1) - 1;
        let builder = ExponentialBuilder::new()
            .with_min_delay(self.initial_backoff)
            .with_max_delay(self.max_backoff)
            .with_factor(self.multiplier.max(1.0) as f32)
            .with_max_times(retries as usize);
        if self.jitter > 0.0 {
            builder.with_jitter()
        } else {
            builder
        }
    }
}

/// Runs `operation` until it succeeds, fails permanently, or the attempt
/// budget is spent.
///
/// Permanent failures are returned on first sight. When the budget runs out
/// the last error is returned as-is, so callers can still tell a transient
/// failure from a permanent one.
pub async fn with_retry<F, Fut, T, E>(
    policy: &RetryPolicy,
    operation_name: &str,
    operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let mut retries: u32 = 0;

    let result = operation
        .retry(policy.backoff())
        .sleep(tokio::time::sleep)
        .when(|e: &E| e.is_retryable())
        .notify(|e: &E, delay: Duration| {
            retries += 1;
            debug!(
                operation = operation_name,
                attempt = retries,
                backoff_ms = delay.as_millis() as u64,
                error = %e,
                "retrying after backoff"
            );
        })
        .await;

    match result {
        Err(e) if e.is_retryable() => {
            warn!(
                operation = operation_name,
                attempts = retries + 1,
                error = %e,
                "retry budget exhausted"
            );
            Err(e)
        }
        Err(e) => {
            debug!(operation = operation_name, error = %e, "permanent failure");
            Err(e)
        }
        ok => ok,
    }
}

use std::{
    future::Future,
    iter::{Map, Take},
    time::Duration,
};

use tokio_retry::{RetryIf, strategy::ExponentialBackoff};
use tracing::warn;

use crate::error::FetchError;

/// Upper bound for a single backoff delay.
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// How transient remote failures are retried.
///
/// The default never retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry, doubled on each following one
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

impl RetryPolicy {
    /// A policy that sends every request exactly once.
    pub const fn disabled() -> Self {
        Self { max_retries: 0, initial_backoff: Duration::from_millis(500) }
    }

    /// Retry up to `max_retries` times, starting at `initial_backoff`.
    pub const fn new(max_retries: u32, initial_backoff: Duration) -> Self {
        Self { max_retries, initial_backoff }
    }

    fn strategy(&self) -> Take<Map<ExponentialBackoff, fn(Duration) -> Duration>> {
        // `from_millis(2).factor(initial)` yields 2x, 4x, 8x initial; halving each
        // delay gives initial, 2x initial, 4x initial.
        let initial_ms = u64::try_from(self.initial_backoff.as_millis()).unwrap_or(u64::MAX);
        ExponentialBackoff::from_millis(2)
            .factor(initial_ms)
            .max_delay(MAX_BACKOFF * 2)
            .map(halve as fn(Duration) -> Duration)
            .take(self.max_retries as usize)
    }
}

fn halve(delay: Duration) -> Duration {
    delay / 2
}

/// Run `op`, retrying it under `policy` while the error is transient.
pub(crate) async fn retry_op<F, Fut, T>(policy: RetryPolicy, op: F) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    RetryIf::spawn(policy.strategy(), op, |err: &FetchError| {
        let retry = policy.max_retries > 0 && err.is_retryable();
        if retry {
            warn!(error = %err, max_retries = policy.max_retries, "transient remote failure");
        }
        retry
    })
    .await
}

//! Stage-level retry with exponential backoff and jitter
//!
//! The pipeline never retries on its own. A caller opts in by handing the
//! orchestrator a [`RetryPolicy`]; each retry resubmits the same stage with
//! the same inputs.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Errors that know whether resubmitting can help
pub trait Retriable {
    fn is_retriable(&self) -> bool;

    /// Delay suggested by the service, if any
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first; 1 disables retrying
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Random variation applied to each delay, as a fraction (0.25 = ±25%)
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::from_secs(2),
            max_delay: DEFAULT_MAX_DELAY,
            jitter: 0.25,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    /// Delay before the attempt following `failed_attempt` (1-indexed).
    ///
    /// A server-suggested delay wins over backoff; both are capped at
    /// `max_delay`.
    pub fn delay_for_retry(&self, failed_attempt: u32, suggested: Option<Duration>) -> Duration {
        if let Some(delay) = suggested {
            return delay.min(self.max_delay);
        }

        let exponent = failed_attempt.saturating_sub(1).min(16);
        let backoff = self
            .base_delay
            .saturating_mul(1_u32 << exponent)
            .min(self.max_delay);
        apply_jitter(backoff, self.jitter).min(self.max_delay)
    }
}

fn apply_jitter(duration: Duration, jitter: f64) -> Duration {
    if jitter <= 0.0 {
        return duration;
    }
    let factor = 1.0 + rand::rng().random_range(-jitter..=jitter);
    Duration::from_millis((duration.as_millis() as f64 * factor).max(0.0) as u64)
}

/// Runs `op` until it succeeds, fails with a non-retriable error, or the
/// policy's attempts are used up.
///
/// `op` receives the 1-indexed attempt number. If `cancel` fires during a
/// backoff wait, the last error is returned immediately.
pub async fn retry_stage<T, E, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut op: F,
) -> Result<T, E>
where
    E: Retriable + std::fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if !error.is_retriable() || attempt >= policy.max_attempts {
                    return Err(error);
                }

                let delay = policy.delay_for_retry(attempt, error.retry_after());
                warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Retriable failure: {}",
                    error
                );

                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = cancel.cancelled() => return Err(error),
                }
                attempt += 1;
            }
        }
    }
}

//! Bounded retries with exponential backoff for single-attempt operations.
//!
//! Every error is treated as transient at this layer. When the attempt
//! budget is spent, [`RetryPolicy::run`] hands the last error back to the
//! caller wrapped in [`RetryExhausted`], and the caller decides whether the
//! failure is fatal or skippable. [`RetryPolicy::run_or_none`] is the
//! swallowing variant for call sites that only want a best-effort result.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use dreamer_core::config::ImageGenerationConfig;

/// Tunable parameters for the exponential-backoff strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Values below 1 act as 1.
    pub max_attempts: u32,
    /// Lower bound on the delay between attempts.
    pub min_wait: Duration,
    /// Upper bound on the delay between attempts.
    pub max_wait: Duration,
    /// Seconds of delay after the first failure; doubles after each one.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ImageGenerationConfig::default())
    }
}

/// The attempt budget ran out; carries the final error.
#[derive(Debug, thiserror::Error)]
#[error("gave up after {attempts} attempt(s): {last_error}")]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    #[source]
    pub last_error: E,
}

impl RetryPolicy {
    /// Policy for image generation: `retries + 1` attempts, multiplier 2,
    /// waits clamped to the configured bounds.
    pub fn from_config(config: &ImageGenerationConfig) -> Self {
        Self {
            max_attempts: config.max_attempts(),
            min_wait: config.min_wait(),
            max_wait: config.max_wait(),
            multiplier: 2.0,
        }
    }

    /// Policy with no waiting between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            min_wait: Duration::ZERO,
            max_wait: Duration::ZERO,
            multiplier: 0.0,
        }
    }

    /// Delay after failed attempt number `attempt` (1-based).
    ///
    /// `multiplier * 2^(attempt - 1)` seconds, clamped to
    /// `[min_wait, max_wait]`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(63) as i32;
        let raw_secs = self.multiplier * 2f64.powi(exponent);
        let secs = raw_secs
            .max(self.min_wait.as_secs_f64())
            .min(self.max_wait.as_secs_f64());
        if secs.is_finite() && secs > 0.0 {
            Duration::from_secs_f64(secs)
        } else {
            Duration::ZERO
        }
    }

    /// Run `op` until it succeeds or the attempt budget is spent.
    ///
    /// `op` receives the 1-based attempt number. Sleeps between attempts
    /// but never after the final one.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, RetryExhausted<E>>
    where
        E: Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            match op(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!(label, attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) if attempt >= max_attempts => {
                    tracing::warn!(
                        label,
                        attempts = attempt,
                        error = %e,
                        "Retries exhausted",
                    );
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last_error: e,
                    });
                }
                Err(e) => {
                    let delay = self.delay_after(attempt);
                    tracing::warn!(
                        label,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Attempt failed, retrying",
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }

    /// Like [`run`](Self::run), but logs exhaustion and returns `None`.
    pub async fn run_or_none<T, E, F, Fut>(&self, label: &str, op: F) -> Option<T>
    where
        E: Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.run(label, op).await {
            Ok(value) => Some(value),
            Err(exhausted) => {
                tracing::warn!(label, error = %exhausted, "Giving up without a result");
                None
            }
        }
    }
}

//! Retry execution with exponential backoff and jitter.
//!
//! Wraps a single fallible async operation and re-invokes it on failure up
//! to a bounded attempt count. Backoff suspends the calling task only; other
//! callers keep running.

use crate::errors::ResilienceResult;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Configuration for retry behavior.
///
/// Defaults perform exactly one attempt; retries must be asked for
/// explicitly. All defaulting happens here, at construction.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts, including the first (minimum 1)
    pub max_attempts: u32,
    /// Delay between attempts before backoff scaling
    pub base_delay: Duration,
    /// Double the delay after each failed attempt
    pub exponential: bool,
    /// Scale each delay by a random factor in [1.0, 2.0)
    pub jitter: bool,
    /// Upper bound applied to the final computed delay
    pub max_delay: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: crate::DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::ZERO,
            exponential: false,
            jitter: false,
            max_delay: None,
        }
    }
}

impl RetryConfig {
    /// Creates a configuration that performs a single attempt.
    pub fn new() -> Self {
        Self::default()
    }

    /// The profile used for AI provider calls: three attempts with
    /// jittered exponential backoff starting at 100ms.
    pub fn standard() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            exponential: true,
            jitter: true,
            max_delay: Some(Duration::from_secs(5)),
        }
    }

    /// Sets the total attempt count (values below 1 act as 1).
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the base delay between attempts.
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Enables or disables exponential backoff.
    pub fn exponential(mut self, enabled: bool) -> Self {
        self.exponential = enabled;
        self
    }

    /// Enables or disables jitter.
    pub fn jitter(mut self, enabled: bool) -> Self {
        self.jitter = enabled;
        self
    }

    /// Caps the computed delay.
    pub fn max_delay(mut self, cap: Duration) -> Self {
        self.max_delay = Some(cap);
        self
    }
}

/// Executes operations with bounded retries and computed backoff.
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    /// Creates a new retry executor with the given configuration.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Creates a retry executor with the single-attempt default.
    pub fn with_defaults() -> Self {
        Self::new(RetryConfig::default())
    }

    /// Returns the retry configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Executes an operation, retrying on any failure until the attempt
    /// budget is spent.
    ///
    /// Returns the first success, or the last underlying error once
    /// `max_attempts` consecutive failures have occurred. The `context`
    /// label is used only for diagnostics.
    pub async fn execute<F, Fut, T>(&self, context: &str, operation: F) -> ResilienceResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ResilienceResult<T>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 0..max_attempts {
            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!(
                            context,
                            attempts = attempt + 1,
                            "Operation succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(e) => {
                    tracing::warn!(
                        context,
                        attempt = attempt + 1,
                        max_attempts,
                        error = %e,
                        "Operation attempt failed"
                    );
                    last_error = Some(e);

                    if attempt + 1 < max_attempts {
                        let delay = self.delay_for_attempt(attempt);
                        if !delay.is_zero() {
                            sleep(delay).await;
                        }
                    }
                }
            }
        }

        tracing::error!(
            context,
            attempts = max_attempts,
            "Operation failed after exhausting all attempts"
        );
        // The loop above runs at least once, so last_error is always set.
        Err(last_error.unwrap())
    }

    /// Computes the delay after the failed attempt with the given
    /// zero-based index.
    fn delay_for_attempt(&self, attempt_index: u32) -> Duration {
        let base_ms = self.config.base_delay.as_millis() as f64;

        let mut delay_ms = if self.config.exponential {
            base_ms * 2f64.powi(attempt_index as i32)
        } else {
            base_ms
        };

        if self.config.jitter {
            delay_ms *= 1.0 + rand::random::<f64>();
        }

        if let Some(cap) = self.config.max_delay {
            delay_ms = delay_ms.min(cap.as_millis() as f64);
        }

        Duration::from_millis(delay_ms as u64)
    }
}

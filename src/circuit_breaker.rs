//! Circuit breaker guarding calls to a single upstream dependency.
//!
//! Tracks consecutive failures and fails fast once a threshold is reached,
//! probing recovery with a half-open trial after a cooldown. Status and the
//! failure counter are mutated together under one lock so concurrent callers
//! never observe a half-applied transition.

use crate::errors::{ResilienceError, ResilienceResult};
use parking_lot::Mutex;
use std::future::Future;
use std::time::{Duration, Instant};

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Circuit is closed, calls flow normally
    Closed,
    /// Circuit is open, calls are rejected without being attempted
    Open,
    /// Circuit is probing recovery after the cooldown
    HalfOpen,
}

/// Configuration for circuit breaker behavior
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit
    pub failure_threshold: u32,
    /// Time an open circuit waits before admitting a half-open trial
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: crate::DEFAULT_FAILURE_THRESHOLD,
            cooldown: Duration::from_secs(crate::DEFAULT_COOLDOWN_SECS),
        }
    }
}

impl CircuitBreakerConfig {
    /// Creates a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the failure threshold.
    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Sets the cooldown before half-open.
    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }
}

/// Point-in-time view of a breaker, cheap to take for dashboards.
#[derive(Debug, Clone)]
pub struct CircuitMetrics {
    /// Key of the circuit these metrics describe
    pub breaker_key: String,
    /// Current state
    pub state: CircuitState,
    /// Consecutive failures recorded since the last success
    pub consecutive_failures: u32,
    /// Calls admitted past the breaker
    pub total_calls: u64,
    /// Admitted calls that failed
    pub total_failures: u64,
    /// Calls rejected while the circuit was open
    pub total_rejections: u64,
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    total_calls: u64,
    total_failures: u64,
    total_rejections: u64,
}

/// Circuit breaker for one named dependency.
#[derive(Debug)]
pub struct CircuitBreaker {
    key: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    /// Creates a new circuit breaker for the given key.
    pub fn new(key: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            key: key.into(),
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at: None,
                total_calls: 0,
                total_failures: 0,
                total_rejections: 0,
            }),
        }
    }

    /// Returns the breaker key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the current state of the circuit breaker.
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    /// Admits or rejects a call.
    ///
    /// An open circuit whose cooldown has elapsed transitions to half-open
    /// here, admitting the caller as the recovery trial. Callers that are
    /// admitted must report the outcome via [`record_success`] or
    /// [`record_failure`] exactly once.
    ///
    /// [`record_success`]: CircuitBreaker::record_success
    /// [`record_failure`]: CircuitBreaker::record_failure
    pub fn try_acquire(&self) -> ResilienceResult<()> {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed | CircuitState::HalfOpen => {
                inner.total_calls += 1;
                Ok(())
            }
            CircuitState::Open => {
                if let Some(opened_at) = inner.opened_at {
                    if opened_at.elapsed() >= self.config.cooldown {
                        inner.state = CircuitState::HalfOpen;
                        inner.total_calls += 1;
                        tracing::info!(
                            breaker_key = %self.key,
                            "Circuit breaker admitting half-open trial"
                        );
                        return Ok(());
                    }
                }
                inner.total_rejections += 1;
                tracing::warn!(
                    breaker_key = %self.key,
                    "Circuit breaker is open, rejecting call"
                );
                Err(ResilienceError::CircuitOpen {
                    breaker_key: self.key.clone(),
                })
            }
        }
    }

    /// Records a successful call.
    pub fn record_success(&self) {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures = 0;
            }
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Closed;
                inner.consecutive_failures = 0;
                inner.opened_at = None;
                tracing::info!(
                    breaker_key = %self.key,
                    "Circuit breaker closed after successful trial"
                );
            }
            CircuitState::Open => {}
        }
    }

    /// Records a failed call.
    pub fn record_failure(&self) {
        let mut inner = self.inner.lock();
        inner.total_failures += 1;
        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.config.failure_threshold {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(Instant::now());
                    tracing::error!(
                        breaker_key = %self.key,
                        failures = inner.consecutive_failures,
                        "Circuit breaker opened"
                    );
                }
            }
            CircuitState::HalfOpen => {
                inner.consecutive_failures += 1;
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                tracing::warn!(
                    breaker_key = %self.key,
                    "Circuit breaker re-opened after failed trial"
                );
            }
            CircuitState::Open => {}
        }
    }

    /// Executes an operation through the breaker: one admission check, one
    /// invocation, one outcome recorded.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> ResilienceResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ResilienceResult<T>>,
    {
        self.try_acquire()?;
        match operation().await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(e) => {
                self.record_failure();
                Err(e)
            }
        }
    }

    /// Returns the time until an open circuit admits its half-open trial.
    ///
    /// `None` when the circuit is not open.
    pub fn time_until_half_open(&self) -> Option<Duration> {
        let inner = self.inner.lock();
        if inner.state != CircuitState::Open {
            return None;
        }
        let elapsed = inner.opened_at?.elapsed();
        Some(self.config.cooldown.saturating_sub(elapsed))
    }

    /// Takes a metrics snapshot.
    pub fn metrics(&self) -> CircuitMetrics {
        let inner = self.inner.lock();
        CircuitMetrics {
            breaker_key: self.key.clone(),
            state: inner.state,
            consecutive_failures: inner.consecutive_failures,
            total_calls: inner.total_calls,
            total_failures: inner.total_failures,
            total_rejections: inner.total_rejections,
        }
    }

    /// Resets the breaker to closed with a zeroed failure counter.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.state = CircuitState::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
    }
}

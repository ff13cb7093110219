//! Error types for the resilience executors.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for resilience operations
pub type ResilienceResult<T> = Result<T, ResilienceError>;

/// Main error type for the resilience executors.
///
/// Wrapped operations report failures through this enum; the executors add
/// exactly one synthesized variant of their own ([`ResilienceError::CircuitOpen`])
/// so callers can tell a rejected call from a failed one.
#[derive(Error, Debug, Clone)]
pub enum ResilienceError {
    /// Upstream service failure (Supabase, AI provider, or any wrapped call)
    #[error("Upstream error: {message}")]
    Upstream {
        /// Error message reported by the wrapped operation
        message: String,
    },

    /// The wrapped operation timed out on its own deadline
    #[error("Timeout: {message}")]
    Timeout {
        /// Error message describing the timeout
        message: String,
    },

    /// Upstream rate limit hit (too many requests, quota exceeded)
    #[error("Rate limited: {message}")]
    RateLimited {
        /// Error message describing the rate limit
        message: String,
        /// Duration to wait before retrying, if the service provided one
        retry_after: Option<Duration>,
    },

    /// Call rejected without being attempted: the named circuit is open
    #[error("Circuit breaker is open: {breaker_key}")]
    CircuitOpen {
        /// Key of the circuit that rejected the call
        breaker_key: String,
    },
}

impl ResilienceError {
    /// Returns true if this error is a fail-fast circuit rejection rather
    /// than an actual operation failure.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, ResilienceError::CircuitOpen { .. })
    }

    /// Returns the retry-after duration if available.
    ///
    /// Set on rate-limit errors when the upstream service provided a
    /// Retry-After hint.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ResilienceError::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

impl From<std::io::Error> for ResilienceError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut => ResilienceError::Timeout {
                message: err.to_string(),
            },
            _ => ResilienceError::Upstream {
                message: err.to_string(),
            },
        }
    }
}

//! Named circuit breaker registry.
//!
//! One breaker per key, created lazily on first use. Keys are dependency
//! names (`supabase`, `openai`, `gemini`, ...), not request identifiers:
//! entries live for the registry's lifetime and are never evicted, so the
//! map stays as small as the set of dependencies a service talks to.

use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitMetrics, CircuitState};
use crate::errors::ResilienceResult;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Registry of independent circuit breakers keyed by name.
///
/// Breakers for different keys never share state. The registry itself is a
/// plain owned value; services construct one (usually inside a
/// [`ResilienceOrchestrator`]) and pass it where it is needed rather than
/// reaching for a global.
///
/// [`ResilienceOrchestrator`]: crate::orchestrator::ResilienceOrchestrator
pub struct CircuitBreakerRegistry {
    config: CircuitBreakerConfig,
    breakers: Mutex<HashMap<String, Arc<CircuitBreaker>>>,
}

impl CircuitBreakerRegistry {
    /// Creates a registry whose breakers use the given configuration.
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            breakers: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a registry with the default breaker configuration.
    pub fn with_defaults() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }

    /// Returns the breaker for `key`, creating it closed with zero failures
    /// on first use.
    pub fn breaker(&self, key: &str) -> Arc<CircuitBreaker> {
        let mut breakers = self.breakers.lock();
        if let Some(breaker) = breakers.get(key) {
            return Arc::clone(breaker);
        }
        let breaker = Arc::new(CircuitBreaker::new(key, self.config.clone()));
        breakers.insert(key.to_string(), Arc::clone(&breaker));
        tracing::debug!(breaker_key = key, "Created circuit breaker");
        breaker
    }

    /// Executes an operation through the breaker for `key`.
    ///
    /// Fail-fast semantics: while the circuit is open the operation is never
    /// invoked and the call returns [`ResilienceError::CircuitOpen`].
    ///
    /// [`ResilienceError::CircuitOpen`]: crate::errors::ResilienceError::CircuitOpen
    pub async fn execute<F, Fut, T>(&self, key: &str, operation: F) -> ResilienceResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ResilienceResult<T>>,
    {
        self.breaker(key).execute(operation).await
    }

    /// Returns the state of the breaker for `key`, if one exists.
    pub fn state(&self, key: &str) -> Option<CircuitState> {
        self.breakers.lock().get(key).map(|b| b.state())
    }

    /// Takes a metrics snapshot of every breaker.
    pub fn metrics(&self) -> Vec<CircuitMetrics> {
        self.breakers.lock().values().map(|b| b.metrics()).collect()
    }

    /// Number of breakers created so far.
    pub fn len(&self) -> usize {
        self.breakers.lock().len()
    }

    /// True when no breaker has been created yet.
    pub fn is_empty(&self) -> bool {
        self.breakers.lock().is_empty()
    }
}

impl std::fmt::Debug for CircuitBreakerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreakerRegistry")
            .field("breakers", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ResilienceError;
    use std::time::Duration;

    fn registry(threshold: u32) -> CircuitBreakerRegistry {
        CircuitBreakerRegistry::new(
            CircuitBreakerConfig::new()
                .failure_threshold(threshold)
                .cooldown(Duration::from_secs(30)),
        )
    }

    fn upstream_error() -> ResilienceError {
        ResilienceError::Upstream {
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_lazy_creation() {
        let registry = registry(5);
        assert!(registry.is_empty());
        assert_eq!(registry.state("supabase"), None);

        let breaker = registry.breaker("supabase");
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.state("supabase"), Some(CircuitState::Closed));
    }

    #[test]
    fn test_same_breaker_for_same_key() {
        let registry = registry(5);
        let a = registry.breaker("openai");
        let b = registry.breaker("openai");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_keys_are_isolated() {
        let registry = registry(2);

        for _ in 0..2 {
            let _ = registry
                .execute("failing", || async { Err::<(), _>(upstream_error()) })
                .await;
        }
        assert_eq!(registry.state("failing"), Some(CircuitState::Open));

        // The failing circuit never touches this one
        let result = registry.execute("healthy", || async { Ok(1) }).await;
        assert_eq!(result.unwrap(), 1);
        assert_eq!(registry.state("healthy"), Some(CircuitState::Closed));
    }

    #[tokio::test]
    async fn test_open_circuit_skips_operation() {
        let registry = registry(1);
        let _ = registry
            .execute("gemini", || async { Err::<(), _>(upstream_error()) })
            .await;

        let invoked = std::sync::atomic::AtomicBool::new(false);
        let result = registry
            .execute("gemini", || async {
                invoked.store(true, std::sync::atomic::Ordering::SeqCst);
                Ok(1)
            })
            .await;

        assert!(result.is_err());
        assert!(!invoked.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn test_metrics_snapshot() {
        let registry = registry(5);
        registry.breaker("a").record_failure();
        registry.breaker("b");

        let metrics = registry.metrics();
        assert_eq!(metrics.len(), 2);
        let a = metrics.iter().find(|m| m.breaker_key == "a").unwrap();
        assert_eq!(a.consecutive_failures, 1);
    }
}

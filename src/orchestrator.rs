//! Composed resilience execution: a named circuit breaker gating a retry
//! loop.
//!
//! The breaker is consulted before the retry executor, so an open circuit
//! fails fast without spending any retry attempts, and the retry executor's
//! final outcome feeds back into the circuit exactly once per call —
//! exhausting every attempt counts as a single failure toward the
//! threshold.

use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
use crate::errors::ResilienceResult;
use crate::registry::CircuitBreakerRegistry;
use crate::retry::{RetryConfig, RetryExecutor};
use std::future::Future;
use std::sync::Arc;

/// Configuration for composed resilience behavior
#[derive(Debug, Clone)]
pub struct ResilienceConfig {
    /// Retry configuration applied by [`ResilienceOrchestrator::execute`]
    pub retry: RetryConfig,
    /// Configuration for breakers created by the orchestrator's registry
    pub circuit_breaker: CircuitBreakerConfig,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}

/// Runs operations behind a circuit breaker and a retry loop.
pub struct ResilienceOrchestrator {
    retry: RetryExecutor,
    registry: Arc<CircuitBreakerRegistry>,
}

impl ResilienceOrchestrator {
    /// Creates a new orchestrator with the given configuration.
    pub fn new(config: ResilienceConfig) -> Self {
        Self {
            retry: RetryExecutor::new(config.retry),
            registry: Arc::new(CircuitBreakerRegistry::new(config.circuit_breaker)),
        }
    }

    /// Creates a builder for configuring the orchestrator.
    pub fn builder() -> ResilienceOrchestratorBuilder {
        ResilienceOrchestratorBuilder::new()
    }

    /// Creates an orchestrator that applies no resilience: single attempts,
    /// a threshold no realistic workload reaches.
    pub fn passthrough() -> Self {
        Self::new(ResilienceConfig {
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::new().failure_threshold(u32::MAX),
        })
    }

    /// Returns the shared circuit breaker registry.
    pub fn registry(&self) -> Arc<CircuitBreakerRegistry> {
        Arc::clone(&self.registry)
    }

    /// Executes an operation with the orchestrator's default retry
    /// configuration, guarded by the breaker for `breaker_key`.
    pub async fn execute<F, Fut, T>(&self, breaker_key: &str, operation: F) -> ResilienceResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ResilienceResult<T>>,
    {
        let breaker = self.registry.breaker(breaker_key);
        execute_guarded(&breaker, &self.retry, breaker_key, operation).await
    }

    /// Executes an operation with a per-call retry configuration, guarded by
    /// the breaker for `breaker_key`.
    ///
    /// The circuit state is shared with every other call using the same key,
    /// whatever retry configuration each one passes.
    pub async fn execute_with_config<F, Fut, T>(
        &self,
        breaker_key: &str,
        retry_config: RetryConfig,
        operation: F,
    ) -> ResilienceResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ResilienceResult<T>>,
    {
        let breaker = self.registry.breaker(breaker_key);
        let executor = RetryExecutor::new(retry_config);
        execute_guarded(&breaker, &executor, breaker_key, operation).await
    }
}

/// Breaker check, retry loop, then a single outcome recorded against the
/// circuit.
async fn execute_guarded<F, Fut, T>(
    breaker: &CircuitBreaker,
    executor: &RetryExecutor,
    context: &str,
    operation: F,
) -> ResilienceResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = ResilienceResult<T>>,
{
    breaker.try_acquire()?;

    let result = executor.execute(context, operation).await;
    match &result {
        Ok(_) => breaker.record_success(),
        Err(_) => breaker.record_failure(),
    }
    result
}

impl Default for ResilienceOrchestrator {
    fn default() -> Self {
        Self::new(ResilienceConfig::default())
    }
}

impl std::fmt::Debug for ResilienceOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilienceOrchestrator")
            .field("retry", self.retry.config())
            .field("registry", &self.registry)
            .finish()
    }
}

/// Builder for configuring a [`ResilienceOrchestrator`]
pub struct ResilienceOrchestratorBuilder {
    retry_config: RetryConfig,
    circuit_breaker_config: CircuitBreakerConfig,
    registry: Option<Arc<CircuitBreakerRegistry>>,
}

impl ResilienceOrchestratorBuilder {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            retry_config: RetryConfig::default(),
            circuit_breaker_config: CircuitBreakerConfig::default(),
            registry: None,
        }
    }

    /// Sets the default retry configuration.
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Sets the configuration for breakers the orchestrator creates.
    pub fn circuit_breaker_config(mut self, config: CircuitBreakerConfig) -> Self {
        self.circuit_breaker_config = config;
        self
    }

    /// Shares an existing registry instead of creating one. Takes
    /// precedence over [`circuit_breaker_config`].
    ///
    /// [`circuit_breaker_config`]: ResilienceOrchestratorBuilder::circuit_breaker_config
    pub fn registry(mut self, registry: Arc<CircuitBreakerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Builds the orchestrator.
    pub fn build(self) -> ResilienceOrchestrator {
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(CircuitBreakerRegistry::new(self.circuit_breaker_config)));
        ResilienceOrchestrator {
            retry: RetryExecutor::new(self.retry_config),
            registry,
        }
    }
}

impl Default for ResilienceOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

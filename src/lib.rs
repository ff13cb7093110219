//! # ClaimGuardian Resilience
//!
//! Resilience primitives for ClaimGuardian backend services: retry with
//! backoff, named circuit breakers, and a composed executor that chains
//! the two.
//!
//! Every call to a hosted dependency (Supabase, OpenAI, Gemini, Claude)
//! goes through one of these executors. The executors own no I/O — the
//! caller supplies the operation as an async closure and gets the outcome
//! back as a [`ResilienceResult`]; failures never escape as panics.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use claimguardian_resilience::{ResilienceConfig, ResilienceOrchestrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator = ResilienceOrchestrator::new(ResilienceConfig::default());
//!
//!     let reply: String = orchestrator
//!         .execute("openai", || async {
//!             // the wrapped call to the upstream service goes here
//!             Ok("damage assessment".to_string())
//!         })
//!         .await?;
//!
//!     println!("{reply}");
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - `retry` - Bounded retry with exponential backoff and jitter
//! - `circuit_breaker` - Per-dependency failure tracking and fail-fast
//! - `registry` - Named circuit breakers, created lazily per key
//! - `orchestrator` - Circuit breaker chained in front of the retry loop
//! - `errors` - Error taxonomy and result alias

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod circuit_breaker;
pub mod errors;
pub mod orchestrator;
pub mod registry;
pub mod retry;


pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitMetrics, CircuitState};
pub use errors::{ResilienceError, ResilienceResult};
pub use orchestrator::{ResilienceConfig, ResilienceOrchestrator, ResilienceOrchestratorBuilder};
pub use registry::CircuitBreakerRegistry;
pub use retry::{RetryConfig, RetryExecutor};

/// The default number of consecutive failures that opens a circuit
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;

/// The default cooldown before an open circuit admits a half-open trial
pub const DEFAULT_COOLDOWN_SECS: u64 = 30;

/// The default number of attempts per retry execution (no retries)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1;

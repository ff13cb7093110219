//! Error types for the resilience layer.
//!
//! Every executor converts failure into a [`ResilienceError`] at its
//! boundary; callers never see a panic or an unwound operation error.

mod error;

pub use error::{ResilienceError, ResilienceResult};

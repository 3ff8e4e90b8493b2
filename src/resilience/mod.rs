//! Resilience primitives: retry backoff and circuit breaking

pub mod backoff;
pub mod circuit_breaker;

pub use backoff::delay_for_attempt;
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState, StateChangeFn};

//! Circuit breaker for failing fast against a degraded upstream.
//!
//! The breaker tracks consecutive terminal failures and gates whether a
//! request attempt may be made at all.
//!
//! # States
//!
//! - **Closed**: normal operation, requests pass through
//! - **Open**: too many failures, requests are rejected without touching
//!   the network until the reset timeout elapses
//! - **HalfOpen**: a single probe request is allowed through to test
//!   whether the upstream has recovered

use crate::error::SdkError;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation, requests pass through
    Closed,
    /// Too many failures, requests are rejected
    Open,
    /// Testing whether the upstream has recovered
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "Closed"),
            CircuitState::Open => write!(f, "Open"),
            CircuitState::HalfOpen => write!(f, "HalfOpen"),
        }
    }
}

/// Observer invoked synchronously on every state transition
pub type StateChangeFn = Arc<dyn Fn(CircuitState) + Send + Sync>;

/// Configuration for the circuit breaker
#[derive(Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive terminal failures before the circuit opens
    pub failure_threshold: u32,
    /// Time the circuit stays open before allowing a half-open probe
    pub reset_timeout: Duration,
    /// Invoked with the new state on every transition
    pub on_state_change: Option<StateChangeFn>,
}

impl fmt::Debug for CircuitBreakerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreakerConfig")
            .field("failure_threshold", &self.failure_threshold)
            .field("reset_timeout", &self.reset_timeout)
            .field("on_state_change", &self.on_state_change.is_some())
            .finish()
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(30),
            on_state_change: None,
        }
    }
}

/// Internal state block, mutated only under the write lock
struct BreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    last_failure_time: Option<Instant>,
    probe_in_flight: bool,
}

impl BreakerState {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            last_failure_time: None,
            probe_in_flight: false,
        }
    }
}

/// Circuit breaker owned by one client instance.
///
/// Constructed without a config, the breaker is disabled: every check
/// passes and every report is a no-op.
pub struct CircuitBreaker {
    config: Option<CircuitBreakerConfig>,
    state: Arc<RwLock<BreakerState>>,
}

impl CircuitBreaker {
    /// Create a breaker; `None` yields a disabled breaker
    pub fn new(config: Option<CircuitBreakerConfig>) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(BreakerState::new())),
        }
    }

    /// Current state (reported as Closed when disabled)
    pub async fn state(&self) -> CircuitState {
        self.state.read().await.state
    }

    fn transition(&self, state: &mut BreakerState, next: CircuitState) {
        state.state = next;
        if let Some(config) = &self.config {
            if let Some(observer) = &config.on_state_change {
                observer(next);
            }
        }
    }

    /// Decide whether an attempt may proceed.
    ///
    /// Performs the Open → HalfOpen time-based transition, admits exactly
    /// one probe in HalfOpen, and rejects with [`SdkError::CircuitOpen`]
    /// otherwise. The check and any resulting mutation happen under a single
    /// write-lock acquisition with no await point in between, so two
    /// concurrent operations cannot both claim the half-open probe.
    pub async fn check(&self) -> Result<(), SdkError> {
        let Some(config) = &self.config else {
            return Ok(());
        };

        let mut state = self.state.write().await;
        match state.state {
            CircuitState::Closed => Ok(()),
            CircuitState::Open => {
                let elapsed = state
                    .last_failure_time
                    .map(|t| t.elapsed())
                    .unwrap_or(Duration::ZERO);

                if elapsed >= config.reset_timeout {
                    info!("circuit breaker transitioning to half-open");
                    self.transition(&mut state, CircuitState::HalfOpen);
                    state.probe_in_flight = true;
                    Ok(())
                } else {
                    Err(SdkError::CircuitOpen {
                        retry_after: config.reset_timeout,
                    })
                }
            }
            CircuitState::HalfOpen => {
                if state.probe_in_flight {
                    Err(SdkError::CircuitOpen {
                        retry_after: config.reset_timeout,
                    })
                } else {
                    state.probe_in_flight = true;
                    Ok(())
                }
            }
        }
    }

    /// Record a successful attempt
    pub async fn record_success(&self) {
        if self.config.is_none() {
            return;
        }

        let mut state = self.state.write().await;
        match state.state {
            CircuitState::Closed => {
                state.consecutive_failures = 0;
            }
            CircuitState::HalfOpen => {
                info!("circuit breaker closing after successful probe");
                state.consecutive_failures = 0;
                state.probe_in_flight = false;
                self.transition(&mut state, CircuitState::Closed);
            }
            CircuitState::Open => {
                state.consecutive_failures = 0;
            }
        }
    }

    /// Record a terminal failure
    pub async fn record_failure(&self) {
        let Some(config) = &self.config else {
            return;
        };

        let mut state = self.state.write().await;
        state.consecutive_failures += 1;
        state.last_failure_time = Some(Instant::now());

        match state.state {
            CircuitState::Closed => {
                if state.consecutive_failures >= config.failure_threshold {
                    warn!(
                        "circuit breaker opening after {} consecutive failures",
                        state.consecutive_failures
                    );
                    self.transition(&mut state, CircuitState::Open);
                }
            }
            CircuitState::HalfOpen => {
                // A single probe failure reopens; the threshold only
                // governs the Closed state.
                warn!("circuit breaker re-opening after failed probe");
                state.probe_in_flight = false;
                self.transition(&mut state, CircuitState::Open);
            }
            CircuitState::Open => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::time::sleep;

    fn config(threshold: u32, reset: Duration) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: threshold,
            reset_timeout: reset,
            on_state_change: None,
        }
    }

    #[tokio::test]
    async fn test_starts_closed() {
        let breaker = CircuitBreaker::new(Some(CircuitBreakerConfig::default()));
        assert_eq!(breaker.state().await, CircuitState::Closed);
        assert!(breaker.check().await.is_ok());
    }

    #[tokio::test]
    async fn test_opens_after_threshold_failures() {
        let breaker = CircuitBreaker::new(Some(config(3, Duration::from_secs(10))));

        for _ in 0..2 {
            breaker.record_failure().await;
            assert_eq!(breaker.state().await, CircuitState::Closed);
        }
        breaker.record_failure().await;
        assert_eq!(breaker.state().await, CircuitState::Open);

        let rejected = breaker.check().await;
        assert!(matches!(rejected, Err(SdkError::CircuitOpen { .. })));
    }

    #[tokio::test]
    async fn test_success_resets_failure_count() {
        let breaker = CircuitBreaker::new(Some(config(3, Duration::from_secs(10))));

        breaker.record_failure().await;
        breaker.record_failure().await;
        breaker.record_success().await;
        breaker.record_failure().await;
        breaker.record_failure().await;

        assert_eq!(breaker.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_half_open_after_reset_timeout() {
        let breaker = CircuitBreaker::new(Some(config(1, Duration::from_millis(50))));

        breaker.record_failure().await;
        assert_eq!(breaker.state().await, CircuitState::Open);

        sleep(Duration::from_millis(80)).await;

        // The triggering attempt is allowed through as the probe
        assert!(breaker.check().await.is_ok());
        assert_eq!(breaker.state().await, CircuitState::HalfOpen);
    }

    #[tokio::test]
    async fn test_half_open_probe_success_closes() {
        let breaker = CircuitBreaker::new(Some(config(1, Duration::from_millis(50))));

        breaker.record_failure().await;
        sleep(Duration::from_millis(80)).await;
        assert!(breaker.check().await.is_ok());

        breaker.record_success().await;
        assert_eq!(breaker.state().await, CircuitState::Closed);
        assert!(breaker.check().await.is_ok());
    }

    #[tokio::test]
    async fn test_half_open_probe_failure_reopens() {
        let breaker = CircuitBreaker::new(Some(config(5, Duration::from_millis(50))));

        for _ in 0..5 {
            breaker.record_failure().await;
        }
        assert_eq!(breaker.state().await, CircuitState::Open);

        sleep(Duration::from_millis(80)).await;
        assert!(breaker.check().await.is_ok());

        // One probe failure reopens regardless of the threshold
        breaker.record_failure().await;
        assert_eq!(breaker.state().await, CircuitState::Open);
        assert!(matches!(
            breaker.check().await,
            Err(SdkError::CircuitOpen { .. })
        ));
    }

    #[tokio::test]
    async fn test_second_probe_rejected_while_first_in_flight() {
        let breaker = CircuitBreaker::new(Some(config(1, Duration::from_millis(50))));

        breaker.record_failure().await;
        sleep(Duration::from_millis(80)).await;

        assert!(breaker.check().await.is_ok());
        assert!(matches!(
            breaker.check().await,
            Err(SdkError::CircuitOpen { .. })
        ));
    }

    #[tokio::test]
    async fn test_disabled_breaker_never_blocks() {
        let breaker = CircuitBreaker::new(None);

        for _ in 0..100 {
            breaker.record_failure().await;
        }
        assert!(breaker.check().await.is_ok());
        assert_eq!(breaker.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_state_change_observer() {
        let seen: Arc<Mutex<Vec<CircuitState>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let breaker = CircuitBreaker::new(Some(CircuitBreakerConfig {
            failure_threshold: 2,
            reset_timeout: Duration::from_millis(50),
            on_state_change: Some(Arc::new(move |state| {
                seen_clone.lock().unwrap().push(state);
            })),
        }));

        breaker.record_failure().await;
        breaker.record_failure().await;
        sleep(Duration::from_millis(80)).await;
        let _ = breaker.check().await;
        breaker.record_success().await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                CircuitState::Open,
                CircuitState::HalfOpen,
                CircuitState::Closed
            ]
        );
    }

    #[tokio::test]
    async fn test_rejection_carries_cooldown() {
        let breaker = CircuitBreaker::new(Some(config(1, Duration::from_secs(30))));
        breaker.record_failure().await;

        match breaker.check().await {
            Err(SdkError::CircuitOpen { retry_after }) => {
                assert_eq!(retry_after, Duration::from_secs(30));
            }
            other => panic!("expected CircuitOpen, got {other:?}"),
        }
    }
}

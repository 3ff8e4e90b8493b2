//! Exponential backoff with jitter for retry delays

use rand::Rng;
use std::time::Duration;

/// Base delay before the first retry
pub const BASE_DELAY: Duration = Duration::from_millis(100);

/// Cap applied to the exponential growth
pub const MAX_DELAY: Duration = Duration::from_secs(10);

/// Lower bound of the uniform jitter factor
const JITTER_MIN: f64 = 0.75;

/// Upper bound of the uniform jitter factor
const JITTER_MAX: f64 = 1.25;

/// Compute the delay to wait before retry attempt `attempt`.
///
/// `attempt` is the 1-based index of the retry (the first retry is 1). The
/// raw delay doubles per retry, capped at [`MAX_DELAY`], then scaled by a
/// uniformly random factor in [0.75, 1.25] so that many concurrent callers
/// do not retry in lockstep.
pub fn delay_for_attempt(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(30);
    let raw = BASE_DELAY
        .saturating_mul(1u32 << exponent)
        .min(MAX_DELAY);

    let factor = rand::thread_rng().gen_range(JITTER_MIN..=JITTER_MAX);
    Duration::from_secs_f64(raw.as_secs_f64() * factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(attempt: u32) -> (Duration, Duration) {
        let raw = BASE_DELAY
            .saturating_mul(1u32 << (attempt - 1).min(30))
            .min(MAX_DELAY);
        (
            Duration::from_secs_f64(raw.as_secs_f64() * JITTER_MIN),
            Duration::from_secs_f64(raw.as_secs_f64() * JITTER_MAX),
        )
    }

    #[test]
    fn test_delay_doubles_per_attempt() {
        for attempt in 1..=5 {
            let (lo, hi) = bounds(attempt);
            for _ in 0..20 {
                let delay = delay_for_attempt(attempt);
                assert!(
                    delay >= lo && delay <= hi,
                    "attempt {attempt}: {delay:?} outside [{lo:?}, {hi:?}]"
                );
            }
        }
    }

    #[test]
    fn test_delay_is_capped() {
        // 2^(20-1) * 100ms is far past the cap
        let delay = delay_for_attempt(20);
        let max = Duration::from_secs_f64(MAX_DELAY.as_secs_f64() * JITTER_MAX);
        assert!(delay <= max, "{delay:?} exceeds cap {max:?}");
        let min = Duration::from_secs_f64(MAX_DELAY.as_secs_f64() * JITTER_MIN);
        assert!(delay >= min, "{delay:?} below capped floor {min:?}");
    }

    #[test]
    fn test_jitter_varies() {
        let delays: Vec<_> = (0..10).map(|_| delay_for_attempt(3)).collect();
        let all_same = delays.windows(2).all(|w| w[0] == w[1]);
        assert!(!all_same, "jitter should produce different delays");
    }
}

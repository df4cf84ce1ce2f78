//! Backoff policy configuration.

use crate::RetryConfigError;
use std::time::Duration;

/// Default number of attempts, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay before the second attempt.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Default growth factor between consecutive delays.
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Default ceiling on any single delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// Bounded exponential backoff.
///
/// The delay after attempt `n` is `base_delay × multiplier^(n−1)`, capped at `max_delay`.
/// The policy defines no overall timeout; callers bound the whole sequence themselves.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    multiplier: f64,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            multiplier: DEFAULT_MULTIPLIER,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Create a new policy.
    ///
    /// # Errors
    ///
    /// Returns [`RetryConfigError`] if `max_attempts` is zero, `multiplier` is not a finite
    /// value of at least 1.0, or `base_delay` exceeds `max_delay`.
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        multiplier: f64,
        max_delay: Duration,
    ) -> Result<Self, RetryConfigError> {
        if max_attempts == 0 {
            return Err(RetryConfigError::InvalidInput(
                "max_attempts must be at least 1".into(),
            ));
        }

        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(RetryConfigError::InvalidInput(format!(
                "multiplier must be a finite value >= 1.0, got {multiplier}"
            )));
        }

        if base_delay > max_delay {
            return Err(RetryConfigError::InvalidInput(format!(
                "base_delay {base_delay:?} exceeds max_delay {max_delay:?}"
            )));
        }

        Ok(Self {
            max_attempts,
            base_delay,
            multiplier,
            max_delay,
        })
    }

    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let seconds = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let cap = self.max_delay.as_secs_f64();

        if !seconds.is_finite() || seconds >= cap {
            self.max_delay
        } else {
            Duration::from_secs_f64(seconds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_grow_exponentially_until_capped() {
        let policy = RetryPolicy::new(
            10,
            Duration::from_millis(100),
            2.0,
            Duration::from_millis(1_000),
        )
        .expect("valid policy");

        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
        assert_eq!(policy.delay_for(4), Duration::from_millis(800));
        assert_eq!(policy.delay_for(5), Duration::from_millis(1_000));
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_millis(1_000));
    }

    #[test]
    fn default_policy_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2), Duration::from_secs(1));
    }

    #[test]
    fn rejects_invalid_configuration() {
        assert!(RetryPolicy::new(0, DEFAULT_BASE_DELAY, 2.0, DEFAULT_MAX_DELAY).is_err());
        assert!(RetryPolicy::new(3, DEFAULT_BASE_DELAY, 0.5, DEFAULT_MAX_DELAY).is_err());
        assert!(RetryPolicy::new(3, DEFAULT_BASE_DELAY, f64::NAN, DEFAULT_MAX_DELAY).is_err());
        assert!(RetryPolicy::new(
            3,
            Duration::from_secs(60),
            2.0,
            Duration::from_secs(1)
        )
        .is_err());
    }

    #[test]
    fn no_retry_allows_single_attempt() {
        assert_eq!(RetryPolicy::no_retry().max_attempts(), 1);
    }
}

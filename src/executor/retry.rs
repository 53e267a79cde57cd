//! Exponential backoff policy.

use std::time::Duration;

/// Exponential backoff with a delay cap.
///
/// Attempts are counted from 0. A logical request makes at most
/// `max_retries + 1` attempts; the delay slept after failed attempt `n`
/// is `initial_delay * multiplier^n`, capped at `max_delay`.
///
/// # Presets
///
/// | Preset | initial | multiplier | cap |
/// |--------|---------|------------|-----|
/// | [`RetryPolicy::new`] (requests) | 1s | 2.0 | 10s |
/// | [`RetryPolicy::polling`] (execution status) | 1s | 2.0 | 30s |
///
/// # Example
///
/// ```
/// use agentflow::executor::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new().with_max_retries(5);
/// assert_eq!(policy.delay_for_retry(0), Duration::from_secs(1));
/// assert_eq!(policy.delay_for_retry(3), Duration::from_secs(8));
/// assert_eq!(policy.delay_for_retry(4), Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    ///
    /// Zero means a single attempt.
    pub max_retries: u32,

    /// Delay after the first failed attempt.
    pub initial_delay: Duration,

    /// Upper bound on any single delay.
    pub max_delay: Duration,

    /// Growth factor applied per attempt.
    pub multiplier: f64,
}

impl RetryPolicy {
    /// Default retries per request.
    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    /// Default first delay (1 second).
    pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);

    /// Delay cap for request retries (10 seconds).
    pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(10);

    /// Delay cap for execution status polling (30 seconds).
    pub const POLLING_MAX_DELAY: Duration = Duration::from_secs(30);

    /// Default multiplier (2.0).
    pub const DEFAULT_MULTIPLIER: f64 = 2.0;

    /// Creates the request retry policy.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_retries: Self::DEFAULT_MAX_RETRIES,
            initial_delay: Self::DEFAULT_INITIAL_DELAY,
            max_delay: Self::DEFAULT_MAX_DELAY,
            multiplier: Self::DEFAULT_MULTIPLIER,
        }
    }

    /// Creates the policy used between execution status polls.
    ///
    /// `max_retries` is unbounded; the poller stops on its own deadline.
    #[must_use]
    pub const fn polling() -> Self {
        Self {
            max_retries: u32::MAX,
            initial_delay: Self::DEFAULT_INITIAL_DELAY,
            max_delay: Self::POLLING_MAX_DELAY,
            multiplier: Self::DEFAULT_MULTIPLIER,
        }
    }

    /// Sets the number of retries after the first attempt.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the delay after the first failed attempt.
    ///
    /// Zero is allowed but produces a tight retry loop.
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the delay cap.
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the delay multiplier.
    ///
    /// # Panics
    ///
    /// Panics if `multiplier` is not positive (must be > 0.0).
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        assert!(multiplier > 0.0, "multiplier must be positive");
        self.multiplier = multiplier;
        self
    }

    /// Computes the delay after failed attempt `attempt` (0-indexed).
    ///
    /// Never exceeds `max_delay`, however large `attempt` grows.
    #[must_use]
    pub fn delay_for_retry(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let delay_secs = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = delay_secs.min(self.max_delay.as_secs_f64());
        if capped.is_finite() && capped >= 0.0 {
            Duration::from_secs_f64(capped)
        } else {
            self.max_delay
        }
    }

    /// Returns true if another attempt is allowed after failed attempt
    /// `attempt` (0-indexed).
    #[must_use]
    pub const fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// Total attempts this policy allows.
    #[must_use]
    pub const fn max_attempts(&self) -> u64 {
        self.max_retries as u64 + 1
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

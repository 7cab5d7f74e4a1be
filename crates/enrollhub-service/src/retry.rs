//! Exponential backoff with jitter for contention retries.

use std::time::Duration;

use rand::Rng;

use enrollhub_core::config::RetryConfig;

/// How often and how patiently an operation is re-run after contention.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    max_attempts: u32,
    /// Delay before the first retry.
    initial_delay: Duration,
    /// Cap on the exponential delay.
    max_delay: Duration,
    /// Growth factor per attempt.
    backoff_multiplier: f64,
}

impl RetryPolicy {
    /// Build a policy from configuration. At least one attempt is always
    /// made.
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            backoff_multiplier: config.backoff_multiplier,
        }
    }

    /// Total attempts allowed.
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether attempt number `attempt` (0-indexed) may run.
    pub const fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay before retry number `attempt` (0-indexed):
    /// `min(initial * multiplier^attempt, max) * jitter`, jitter in
    /// `[0.5, 1.0]`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let capped = base.min(self.max_delay.as_secs_f64());
        let jitter = rand::thread_rng().gen_range(0.5..=1.0);
        Duration::from_secs_f64(capped * jitter)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

//! Admission engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tuning for the admission engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Retry policy for transactions that fail with contention.
    #[serde(default)]
    pub retry: RetryConfig,
    /// How long a transaction waits for a row or advisory lock before
    /// failing with a contention error.
    #[serde(default = "default_lock_timeout")]
    pub lock_timeout_ms: u64,
    /// Upper bound on nested eviction-and-backfill promotions.
    #[serde(default = "default_max_promotion_depth")]
    pub max_promotion_depth: u32,
}

impl EngineConfig {
    /// Lock wait timeout as a [`Duration`].
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            lock_timeout_ms: default_lock_timeout(),
            max_promotion_depth: default_max_promotion_depth(),
        }
    }
}

/// Exponential backoff settings for contention retries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry in milliseconds.
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,
    /// Cap on the backoff delay in milliseconds.
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
    /// Growth factor applied per attempt.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

fn default_lock_timeout() -> u64 {
    5000
}

fn default_max_promotion_depth() -> u32 {
    32
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> u64 {
    25
}

fn default_max_delay() -> u64 {
    250
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

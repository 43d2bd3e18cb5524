//! Exponential backoff policy.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Retry policy with capped exponential backoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,

    /// Delay before the first retry.
    pub base_delay_ms: u64,

    /// Growth factor per retry.
    pub multiplier: f64,

    /// Upper bound on any single delay.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay_ms: 500,
            multiplier: 2.0,
            max_delay_ms: 30_000,
        }
    }
}

impl RetryConfig {
    /// Delay in milliseconds before retry number `retry_count` (zero based).
    pub fn calculate_delay(&self, retry_count: u32) -> u64 {
        if retry_count == 0 {
            return self.base_delay_ms.min(self.max_delay_ms);
        }

        let delay = self.base_delay_ms as f64 * self.multiplier.powi(retry_count as i32);
        delay.min(self.max_delay_ms as f64) as u64
    }

    pub fn delay(&self, retry_count: u32) -> Duration {
        Duration::from_millis(self.calculate_delay(retry_count))
    }

    pub fn should_retry(&self, retry_count: u32) -> bool {
        retry_count < self.max_retries
    }
}

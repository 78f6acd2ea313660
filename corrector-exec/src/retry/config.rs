use std::time::Duration;

use corrector_core::ResilienceConfig;

/// Fixed-delay retry: `max_retries` extra attempts after the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from(&ResilienceConfig::default())
    }
}

impl RetryConfig {
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl From<&ResilienceConfig> for RetryConfig {
    fn from(r: &ResilienceConfig) -> Self {
        Self {
            max_retries: r.retry_count,
            delay: Duration::from_millis(r.retry_delay_ms),
        }
    }
}

use std::time::Duration;

use crate::retry::config::RetryConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter { delay: Duration },
    Stop { reason: RetryReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    NotRetryable,
    AttemptsExhausted,
}

/// Decide whether to make another attempt.
///
/// - `attempt_no`: 1-based number of the attempt that just failed.
/// - `retryable`: whether the failure class may be retried at all.
pub fn decide_retry(cfg: &RetryConfig, attempt_no: u32, retryable: bool) -> RetryDecision {
    if !retryable {
        return RetryDecision::Stop {
            reason: RetryReason::NotRetryable,
        };
    }
    if attempt_no >= cfg.max_attempts() {
        return RetryDecision::Stop {
            reason: RetryReason::AttemptsExhausted,
        };
    }
    RetryDecision::RetryAfter { delay: cfg.delay }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries: retries,
            delay: Duration::from_millis(5),
        }
    }

    #[test]
    fn zero_retries_means_one_attempt() {
        assert_eq!(
            decide_retry(&cfg(0), 1, true),
            RetryDecision::Stop {
                reason: RetryReason::AttemptsExhausted
            }
        );
    }

    #[test]
    fn retries_with_fixed_delay_until_budget() {
        let c = cfg(2);
        for attempt in 1..=2 {
            assert_eq!(
                decide_retry(&c, attempt, true),
                RetryDecision::RetryAfter {
                    delay: Duration::from_millis(5)
                }
            );
        }
        assert!(matches!(decide_retry(&c, 3, true), RetryDecision::Stop { .. }));
    }

    #[test]
    fn non_retryable_stops_immediately() {
        assert_eq!(
            decide_retry(&cfg(5), 1, false),
            RetryDecision::Stop {
                reason: RetryReason::NotRetryable
            }
        );
    }
}

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::duration;

/// Bounded exponential backoff shared by the query path and stream reconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Zero disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each following one.
    #[serde(with = "duration")]
    pub initial_backoff: Duration,
    /// Upper bound for any single delay.
    #[serde(with = "duration")]
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_millis(500), Duration::from_secs(5))
    }
}

impl RetryPolicy {
    pub const fn new(
        max_retries: u32,
        initial_backoff: Duration,
        max_backoff: Duration,
    ) -> Self {
        Self {
            max_retries,
            initial_backoff,
            max_backoff,
        }
    }

    pub const fn none() -> Self {
        Self::new(0, Duration::ZERO, Duration::ZERO)
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 2u32.saturating_pow(attempt - 1);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Whether retry number `attempt` (1-based) is still within budget.
    pub fn allows(&self, attempt: u32) -> bool {
        attempt <= self.max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_until_capped() {
        let policy =
            RetryPolicy::new(10, Duration::from_secs(1), Duration::from_secs(30));
        assert_eq!(policy.backoff_for(0), Duration::ZERO);
        assert_eq!(policy.backoff_for(1), Duration::from_secs(1));
        assert_eq!(policy.backoff_for(2), Duration::from_secs(2));
        assert_eq!(policy.backoff_for(5), Duration::from_secs(16));
        assert_eq!(policy.backoff_for(6), Duration::from_secs(30));
        assert_eq!(policy.backoff_for(64), Duration::from_secs(30));
    }

    #[test]
    fn budget_counts_retries_not_attempts() {
        let policy = RetryPolicy::default();
        assert!(policy.allows(1));
        assert!(policy.allows(2));
        assert!(!policy.allows(3));
        assert!(!RetryPolicy::none().allows(1));
    }
}

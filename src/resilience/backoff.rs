//! Fixed inter-attempt delay.

use std::time::Duration;

/// Delay used between attempts unless settings override it.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(300);

/// Constant backoff: every retry waits the same amount of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBackoff {
    delay: Duration,
}

impl FixedBackoff {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Delay to wait after `attempt` (1-based) failed, or `None` when that
    /// was the last attempt of the budget.
    pub fn delay_after(&self, attempt: u32, max_attempts: u32) -> Option<Duration> {
        if attempt >= max_attempts {
            None
        } else {
            Some(self.delay)
        }
    }
}

impl Default for FixedBackoff {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_is_constant() {
        let backoff = FixedBackoff::default();
        assert_eq!(backoff.delay_after(1, 5), Some(Duration::from_millis(300)));
        assert_eq!(backoff.delay_after(4, 5), Some(Duration::from_millis(300)));
    }

    #[test]
    fn test_no_delay_after_last_attempt() {
        let backoff = FixedBackoff::new(Duration::from_millis(10));
        assert_eq!(backoff.delay_after(1, 1), None);
        assert_eq!(backoff.delay_after(2, 2), None);
    }
}

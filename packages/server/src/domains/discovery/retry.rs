//! Poll scheduling for the plate-solving stage.

use std::time::Duration;

pub const DEFAULT_POLL_ATTEMPTS: u32 = 20;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// How the wait between attempts grows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    Fixed,
    /// Interval multiplied by `multiplier` after every attempt, capped at `max_interval`
    Exponential {
        multiplier: u32,
        max_interval: Duration,
    },
}

/// Bounded retry schedule: at most `max_attempts` tries, each preceded by a wait.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL)
    }
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
            backoff: Backoff::Fixed,
        }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Wait before the given 1-based attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.interval,
            Backoff::Exponential {
                multiplier,
                max_interval,
            } => {
                let exponent = attempt.saturating_sub(1);
                let factor = multiplier.max(1).saturating_pow(exponent);
                self.interval.saturating_mul(factor).min(max_interval)
            }
        }
    }

    /// Sum of every wait if all attempts are used.
    pub fn worst_case(&self) -> Duration {
        (1..=self.max_attempts)
            .map(|attempt| self.delay_for(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_twenty_polls_three_seconds_apart() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 20);
        assert_eq!(policy.delay_for(1), Duration::from_secs(3));
        assert_eq!(policy.delay_for(20), Duration::from_secs(3));
        assert_eq!(policy.worst_case(), Duration::from_secs(60));
    }

    #[test]
    fn exponential_backoff_is_capped() {
        let policy = RetryPolicy::fixed(6, Duration::from_secs(1)).with_backoff(
            Backoff::Exponential {
                multiplier: 2,
                max_interval: Duration::from_secs(10),
            },
        );

        let delays: Vec<u64> = (1..=6).map(|a| policy.delay_for(a).as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 10, 10]);
        assert_eq!(policy.worst_case(), Duration::from_secs(35));
    }

    #[test]
    fn huge_exponents_saturate_instead_of_overflowing() {
        let policy = RetryPolicy::fixed(100, Duration::from_secs(1)).with_backoff(
            Backoff::Exponential {
                multiplier: 10,
                max_interval: Duration::from_secs(30),
            },
        );
        assert_eq!(policy.delay_for(90), Duration::from_secs(30));
    }
}

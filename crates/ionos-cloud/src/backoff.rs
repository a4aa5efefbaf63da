//! Exponential backoff with a capped total elapsed time

use std::time::Duration;
use tokio::time::Instant;

/// Budget used when a caller passes a zero `max_elapsed`
pub const DEFAULT_MAX_ELAPSED: Duration = Duration::from_secs(10 * 60);

/// Backoff policy for convergence polling
///
/// Waits grow by `multiplier` from `initial_interval` up to `max_interval`.
/// The schedule ends once `max_elapsed` has passed since [`BackoffPolicy::start`].
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    /// First wait
    pub initial_interval: Duration,

    /// Upper bound for a single wait
    pub max_interval: Duration,

    /// Growth factor applied after every wait (values below 1.0 are treated as 1.0)
    pub multiplier: f64,

    /// Total time budget for the whole schedule
    pub max_elapsed: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(30),
            multiplier: 1.5,
            max_elapsed: DEFAULT_MAX_ELAPSED,
        }
    }
}

impl BackoffPolicy {
    /// Default growth with the given budget; zero selects [`DEFAULT_MAX_ELAPSED`]
    pub fn with_max_elapsed(max_elapsed: Duration) -> Self {
        Self {
            max_elapsed: if max_elapsed.is_zero() {
                DEFAULT_MAX_ELAPSED
            } else {
                max_elapsed
            },
            ..Default::default()
        }
    }

    pub fn initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = interval;
        self
    }

    pub fn max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = interval;
        self
    }

    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Budget actually enforced; a zero budget never means "forever"
    pub fn budget(&self) -> Duration {
        if self.max_elapsed.is_zero() {
            DEFAULT_MAX_ELAPSED
        } else {
            self.max_elapsed
        }
    }

    /// Begin a schedule; elapsed time is measured from now
    pub fn start(&self) -> Backoff {
        Backoff {
            current: self.initial_interval.min(self.max_interval),
            max_interval: self.max_interval,
            multiplier: if self.multiplier.is_finite() && self.multiplier >= 1.0 {
                self.multiplier
            } else {
                1.0
            },
            budget: self.budget(),
            started: Instant::now(),
        }
    }
}

/// A running backoff schedule
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    max_interval: Duration,
    multiplier: f64,
    budget: Duration,
    started: Instant,
}

impl Backoff {
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Next wait, or `None` once the budget is spent
    ///
    /// The last wait is clamped so that it ends exactly at the budget.
    pub fn next_delay(&mut self) -> Option<Duration> {
        let remaining = self.budget.checked_sub(self.elapsed())?;
        if remaining.is_zero() {
            return None;
        }

        let delay = self.current.min(remaining);
        self.current = Duration::from_secs_f64(
            (self.current.as_secs_f64() * self.multiplier).min(self.max_interval.as_secs_f64()),
        );
        Some(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_delays_grow_and_cap() {
        let policy = BackoffPolicy::with_max_elapsed(Duration::from_secs(3600))
            .initial_interval(Duration::from_secs(1))
            .max_interval(Duration::from_secs(4))
            .multiplier(2.0);
        let mut backoff = policy.start();

        let delays: Vec<_> = (0..5).filter_map(|_| backoff.next_delay()).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(4),
                Duration::from_secs(4),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_delays_are_non_decreasing() {
        let mut backoff = BackoffPolicy::default().start();
        let mut previous = Duration::ZERO;
        for _ in 0..30 {
            let delay = backoff.next_delay().unwrap();
            assert!(delay >= previous);
            previous = delay;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_after_budget() {
        let policy = BackoffPolicy::with_max_elapsed(Duration::from_secs(10))
            .initial_interval(Duration::from_secs(4))
            .multiplier(1.0);
        let mut backoff = policy.start();

        let mut slept = Duration::ZERO;
        while let Some(delay) = backoff.next_delay() {
            tokio::time::sleep(delay).await;
            slept += delay;
        }

        // 4 + 4 + 2 (clamped to the remaining budget)
        assert_eq!(slept, Duration::from_secs(10));
        assert!(backoff.elapsed() >= backoff.budget());
    }

    #[test]
    fn test_zero_budget_uses_default() {
        let policy = BackoffPolicy::with_max_elapsed(Duration::ZERO);
        assert_eq!(policy.max_elapsed, DEFAULT_MAX_ELAPSED);

        let manual = BackoffPolicy {
            max_elapsed: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(manual.budget(), DEFAULT_MAX_ELAPSED);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shrinking_multiplier_is_clamped() {
        let policy = BackoffPolicy::default()
            .initial_interval(Duration::from_secs(2))
            .multiplier(0.1);
        let mut backoff = policy.start();
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(2)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(2)));
    }
}

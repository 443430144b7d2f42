//! Reconnect delays.

use std::time::Duration;

/// Default cap on the delay between reconnect attempts, in seconds.
pub const DEFAULT_MAX_BACKOFF_SECS: u64 = 100;

/// Shortest delay between reconnect attempts, in seconds.
pub const MIN_BACKOFF_SECS: u64 = 1;

/// Exponential backoff without jitter: 1s, 2s, 4s, ... doubling until the
/// next value would exceed the cap, then the cap forever.
///
/// The iterator never ends; attempts are unbounded.
#[derive(Debug, Clone)]
pub struct Backoff {
    attempt: u32,
    max_secs: u64,
}

impl Backoff {
    /// A cap below one second is raised to one second.
    pub fn new(max_secs: u64) -> Self {
        Self {
            attempt: 0,
            max_secs: max_secs.max(MIN_BACKOFF_SECS),
        }
    }

    /// Delay for attempt `n`, counting from zero. Never shorter than
    /// [`MIN_BACKOFF_SECS`].
    pub fn delay(n: u32, max_secs: u64) -> Duration {
        let max_secs = max_secs.max(MIN_BACKOFF_SECS);
        let secs = 1u64
            .checked_shl(n)
            .filter(|secs| *secs < max_secs)
            .unwrap_or(max_secs);
        Duration::from_secs(secs)
    }

    /// Number of delays handed out so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BACKOFF_SECS)
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let delay = Self::delay(self.attempt, self.max_secs);
        self.attempt = self.attempt.saturating_add(1);
        Some(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_sequence_with_default_cap() {
        let secs: Vec<u64> = Backoff::default().take(10).map(|d| d.as_secs()).collect();
        assert_eq!(secs, vec![1, 2, 4, 8, 16, 32, 64, 100, 100, 100]);
    }

    #[test]
    fn test_backoff_cap_equal_to_power_of_two() {
        let secs: Vec<u64> = Backoff::new(8).take(6).map(|d| d.as_secs()).collect();
        assert_eq!(secs, vec![1, 2, 4, 8, 8, 8]);
    }

    #[test]
    fn test_backoff_never_overflows() {
        assert_eq!(Backoff::delay(63, 100), Duration::from_secs(100));
        assert_eq!(Backoff::delay(64, 100), Duration::from_secs(100));
        assert_eq!(Backoff::delay(u32::MAX, 100), Duration::from_secs(100));
    }

    #[test]
    fn test_backoff_zero_cap_still_waits() {
        let secs: Vec<u64> = Backoff::new(0).take(4).map(|d| d.as_secs()).collect();
        assert_eq!(secs, vec![1, 1, 1, 1]);
        assert_eq!(Backoff::delay(0, 0), Duration::from_secs(1));
        assert_eq!(Backoff::delay(7, 0), Duration::from_secs(1));
    }

    #[test]
    fn test_backoff_counts_attempts() {
        let mut backoff = Backoff::new(30);
        assert_eq!(backoff.attempt(), 0);
        backoff.next();
        backoff.next();
        assert_eq!(backoff.attempt(), 2);
    }
}

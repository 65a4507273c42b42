//! Injected wall-clock
//!
//! Engine computations take `now` from a [`Clock`] instead of reading the system
//! time, so results are reproducible under test.

use chrono::{DateTime, Duration, TimeZone, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads `Utc::now()`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(now)
    }

    /// Unix epoch milliseconds; out-of-range values fall back to the epoch
    pub fn from_millis(millis: i64) -> Self {
        let now = Utc
            .timestamp_millis_opt(millis)
            .single()
            .unwrap_or_default();
        Self(now)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// `now + days`, saturating at the largest representable instant
pub fn add_days(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now.checked_add_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::from_millis(1_700_000_000_000);
        assert_eq!(clock.now().timestamp_millis(), 1_700_000_000_000);
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_add_days() {
        let now = FixedClock::from_millis(0).now();
        assert_eq!(add_days(now, 7).timestamp(), 7 * 86_400);
        assert_eq!(add_days(now, 0), now);
    }

    #[test]
    fn test_add_days_saturates() {
        let now = DateTime::<Utc>::MAX_UTC - Duration::days(1);
        assert_eq!(add_days(now, u32::MAX), DateTime::<Utc>::MAX_UTC);
    }
}

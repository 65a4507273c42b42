//! Forgetting-Curve Estimator
//!
//! Ebbinghaus exponential decay: R = exp(-t / S)
//! - t: days since the most recent event
//! - S: stability in days, 5 + 25 · score(most recent event)
//!
//! The review interval is picked from discrete (mastery, retention) buckets
//! rather than solved from the curve.

use chrono::{DateTime, Utc};

use crate::clock::add_days;
use crate::config::{ForgettingParams, ReviewSchedule};
use crate::sanitize::clamp_unit;
use crate::types::MILLIS_PER_DAY;

/// Fractional days from `then` to `now` (negative when `then` is in the future)
pub fn days_between(then: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - then).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Memory stability in days for the given last-event score
pub fn stability_days(last_score: f64, params: &ForgettingParams) -> f64 {
    let span = params.max_stability_days - params.min_stability_days;
    params.min_stability_days + clamp_unit(last_score) * span
}

/// Estimated recall probability `days_since` days after an event scored `last_score`
pub fn retention(days_since: f64, last_score: f64, params: &ForgettingParams) -> f64 {
    let stability = stability_days(last_score, params);
    if stability <= 0.0 {
        return 0.0;
    }
    clamp_unit((-days_since / stability).exp())
}

/// Days until the next review; bucket bounds are strict
pub fn review_interval_days(mastery_level: f64, retention: f64, schedule: &ReviewSchedule) -> u32 {
    schedule
        .buckets
        .iter()
        .find(|b| mastery_level > b.min_mastery && retention > b.min_retention)
        .map(|b| b.interval_days)
        .unwrap_or(schedule.fallback_interval_days)
}

pub fn next_review_date(
    now: DateTime<Utc>,
    mastery_level: f64,
    retention: f64,
    schedule: &ReviewSchedule,
) -> DateTime<Utc> {
    add_days(now, review_interval_days(mastery_level, retention, schedule))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    const EPS: f64 = 1e-12;

    #[test]
    fn test_days_between() {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        assert!((days_between(t0, t0 + Duration::hours(36)) - 1.5).abs() < EPS);
        assert!((days_between(t0 + Duration::days(2), t0) + 2.0).abs() < EPS);
    }

    #[test]
    fn test_stability_range() {
        let p = ForgettingParams::default();
        assert!((stability_days(0.0, &p) - 5.0).abs() < EPS);
        assert!((stability_days(1.0, &p) - 30.0).abs() < EPS);
        assert!((stability_days(0.5, &p) - 17.5).abs() < EPS);
    }

    #[test]
    fn test_retention_decay() {
        let p = ForgettingParams::default();
        assert!((retention(0.0, 0.8, &p) - 1.0).abs() < EPS);
        // 一个稳定期后 R = e^-1
        assert!((retention(30.0, 1.0, &p) - (-1.0f64).exp()).abs() < EPS);
        assert!(retention(10.0, 0.2, &p) < retention(10.0, 0.9, &p));
        assert!(retention(2.0, 0.5, &p) > retention(20.0, 0.5, &p));
    }

    #[test]
    fn test_retention_future_event_clamped() {
        let p = ForgettingParams::default();
        assert_eq!(retention(-3.0, 0.5, &p), 1.0);
    }

    #[test]
    fn test_review_buckets() {
        let s = ReviewSchedule::default();
        assert_eq!(review_interval_days(0.95, 0.9, &s), 21);
        assert_eq!(review_interval_days(0.95, 0.7, &s), 7);
        assert_eq!(review_interval_days(0.8, 0.9, &s), 7);
        assert_eq!(review_interval_days(0.6, 0.5, &s), 3);
        assert_eq!(review_interval_days(0.6, 0.3, &s), 1);
        assert_eq!(review_interval_days(0.0, 0.0, &s), 1);
    }

    #[test]
    fn test_review_bucket_bounds_are_strict() {
        let s = ReviewSchedule::default();
        assert_eq!(review_interval_days(0.9, 1.0, &s), 7);
        assert_eq!(review_interval_days(0.7, 1.0, &s), 3);
        assert_eq!(review_interval_days(0.5, 1.0, &s), 1);
    }

    #[test]
    fn test_next_review_date() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let s = ReviewSchedule::default();
        assert_eq!(next_review_date(now, 0.95, 1.0, &s), now + Duration::days(21));
        assert_eq!(next_review_date(now, 0.1, 1.0, &s), now + Duration::days(1));
    }
}

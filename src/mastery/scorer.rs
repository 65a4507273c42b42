//! Event Scorer
//!
//! Maps one learning event to a performance score in [0, 1]:
//! - Base: `score / 100` on success (1.0 without a score), `partialCredit` on failure
//! - Multiplicative penalties for edits, hints, retries and anomalous timing

use crate::config::ScoringParams;
use crate::sanitize::clamp_unit;
use crate::types::LearningEvent;

/// Score an event with the default parameters
pub fn event_score(event: &LearningEvent) -> f64 {
    event_score_with(event, &ScoringParams::default())
}

pub fn event_score_with(event: &LearningEvent, params: &ScoringParams) -> f64 {
    let base = if event.success {
        event.score.map(|s| s / 100.0).unwrap_or(1.0)
    } else {
        event.partial_credit.unwrap_or(0.0)
    };

    let mut score = base;

    if event.number_of_changes > params.max_changes_without_penalty {
        score *= params.changes_penalty;
    }

    if event.hints_used > 0 {
        let factor = 1.0 - f64::from(event.hints_used) * params.hint_penalty_per_hint;
        score *= factor.max(params.min_hint_factor);
    }

    if event.attempt_number > 1 {
        let retries = f64::from(event.attempt_number - 1);
        let factor = 1.0 - retries * params.retry_penalty_per_attempt;
        score *= factor.max(params.min_retry_factor);
    }

    // 非正的预期时长视为缺失，避免除零
    if let Some(expected) = event.expected_duration.filter(|e| *e > 0.0) {
        let ratio = event.duration / expected;
        if ratio < params.guessing_ratio {
            score *= params.guessing_penalty;
        } else if ratio > params.struggling_ratio {
            score *= params.struggling_penalty;
        }
    }

    clamp_unit(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BlockType;
    use chrono::Utc;

    const EPS: f64 = 1e-12;

    fn success(score: f64) -> LearningEvent {
        LearningEvent::new("e", "b", BlockType::Quiz, Utc::now(), 60.0, true).with_score(score)
    }

    fn failure() -> LearningEvent {
        LearningEvent::new("e", "b", BlockType::Quiz, Utc::now(), 60.0, false)
    }

    #[test]
    fn test_base_scores() {
        assert!((event_score(&success(80.0)) - 0.8).abs() < EPS);
        let no_score = LearningEvent { score: None, ..success(0.0) };
        assert!((event_score(&no_score) - 1.0).abs() < EPS);
        assert_eq!(event_score(&failure()), 0.0);
        assert!((event_score(&failure().with_partial_credit(0.4)) - 0.4).abs() < EPS);
    }

    #[test]
    fn test_failure_ignores_score() {
        let e = failure().with_score(90.0);
        assert_eq!(event_score(&e), 0.0);
    }

    #[test]
    fn test_changes_penalty() {
        let two = LearningEvent { number_of_changes: 2, ..success(100.0) };
        let three = LearningEvent { number_of_changes: 3, ..success(100.0) };
        assert!((event_score(&two) - 1.0).abs() < EPS);
        assert!((event_score(&three) - 0.9).abs() < EPS);
    }

    #[test]
    fn test_hint_penalty_floor() {
        let three = LearningEvent { hints_used: 3, ..success(100.0) };
        let ten = LearningEvent { hints_used: 10, ..success(100.0) };
        assert!((event_score(&three) - 0.7).abs() < EPS);
        assert!((event_score(&ten) - 0.5).abs() < EPS);
    }

    #[test]
    fn test_retry_penalty_floor() {
        let third = LearningEvent { attempt_number: 3, ..success(100.0) };
        let tenth = LearningEvent { attempt_number: 10, ..success(100.0) };
        assert!((event_score(&third) - 0.8).abs() < EPS);
        assert!((event_score(&tenth) - 0.6).abs() < EPS);
    }

    #[test]
    fn test_timing_penalties() {
        let guess = LearningEvent { duration: 10.0, ..success(100.0) }.with_expected_duration(60.0);
        let slow = LearningEvent { duration: 200.0, ..success(100.0) }.with_expected_duration(60.0);
        let normal = success(100.0).with_expected_duration(60.0);
        assert!((event_score(&guess) - 0.8).abs() < EPS);
        assert!((event_score(&slow) - 0.9).abs() < EPS);
        assert!((event_score(&normal) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_timing_thresholds_are_strict() {
        // r = 0.3 和 r = 3.0 恰好在边界上，不扣分
        let at_guess = LearningEvent { duration: 18.0, ..success(100.0) }.with_expected_duration(60.0);
        let at_slow = LearningEvent { duration: 180.0, ..success(100.0) }.with_expected_duration(60.0);
        assert!((event_score(&at_guess) - 1.0).abs() < EPS);
        assert!((event_score(&at_slow) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_zero_expected_duration_ignored() {
        let e = success(100.0).with_expected_duration(0.0);
        assert!((event_score(&e) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_penalties_compound() {
        // 0.9 (changes) * 0.9 (1 hint) * 0.9 (2nd attempt) * 0.8 (guess)
        let e = LearningEvent {
            number_of_changes: 5,
            hints_used: 1,
            attempt_number: 2,
            duration: 5.0,
            ..success(100.0)
        }
        .with_expected_duration(60.0);
        assert!((event_score(&e) - 0.9 * 0.9 * 0.9 * 0.8).abs() < EPS);
    }

    #[test]
    fn test_out_of_range_input_clamped() {
        assert_eq!(event_score(&success(250.0)), 1.0);
        assert_eq!(event_score(&failure().with_partial_credit(-1.0)), 0.0);
    }
}

//! Velocity & Status Classifier

use crate::config::{AggregateParams, StatusThresholds};
use crate::mastery::aggregate::mean;
use crate::sanitize::finite_or_zero;
use crate::types::MasteryStatus;

/// Mean of the most recent window minus mean of the oldest window
///
/// Window size is `min(n / 2, velocity_max_window)`; fewer than
/// `velocity_min_events` scores yields 0.
pub fn learning_velocity(scores: &[f64], params: &AggregateParams) -> f64 {
    let n = scores.len();
    if n < params.velocity_min_events.max(2) {
        return 0.0;
    }

    let window = (n / 2).min(params.velocity_max_window);
    if window == 0 {
        return 0.0;
    }

    let recent = &scores[..window];
    let earlier = &scores[n - window..];
    finite_or_zero(mean(recent) - mean(earlier))
}

/// Confidence-discounted mastery used for classification
pub fn adjusted_mastery(mastery_level: f64, confidence: f64) -> f64 {
    mastery_level * (0.5 + confidence * 0.5)
}

pub fn classify_status(
    mastery_level: f64,
    confidence: f64,
    total_attempts: u32,
    thresholds: &StatusThresholds,
) -> MasteryStatus {
    if total_attempts == 0 {
        return MasteryStatus::NotStarted;
    }

    let adjusted = adjusted_mastery(mastery_level, confidence);
    if adjusted >= thresholds.mastered {
        MasteryStatus::Mastered
    } else if adjusted >= thresholds.proficient {
        MasteryStatus::Proficient
    } else if adjusted >= thresholds.approaching {
        MasteryStatus::Approaching
    } else {
        MasteryStatus::Developing
    }
}

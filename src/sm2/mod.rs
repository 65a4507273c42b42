//! SM-2 Spaced Repetition Scheduler
//!
//! Classic SuperMemo-2 recurrence over caller-persisted state:
//! - q < 3: repetitions reset to 0, interval back to 1 day
//! - q >= 3: interval 1 → 6 → round(interval × EF), repetitions + 1
//! - EF' = EF + (0.1 - (5 - q) × (0.08 + (5 - q) × 0.02)), bounded to [1.3, 2.5]
//!
//! The interval recurrence uses the ease factor *before* this review.
//!
//! References:
//! - Wozniak, P. A. (1990). Optimization of learning (SuperMemo 2).

use chrono::{DateTime, Utc};

use crate::clock::add_days;
use crate::config::{ScoringParams, Sm2Params};
use crate::mastery::scorer::event_score_with;
use crate::types::{LearningEvent, Quality, SpacedRepetitionParams, MAX_QUALITY};

/// Ease factor adjustment for one review
pub fn ease_delta(quality: Quality) -> f64 {
    let miss = f64::from(MAX_QUALITY - quality.value());
    0.1 - miss * (0.08 + miss * 0.02)
}

/// Apply one review with the default SM-2 parameters
pub fn update_spaced_repetition(
    params: &SpacedRepetitionParams,
    quality: Quality,
    now: DateTime<Utc>,
) -> SpacedRepetitionParams {
    update_spaced_repetition_with(params, quality, now, &Sm2Params::default())
}

pub fn update_spaced_repetition_with(
    params: &SpacedRepetitionParams,
    quality: Quality,
    now: DateTime<Utc>,
    sm2: &Sm2Params,
) -> SpacedRepetitionParams {
    let prior_ease = if params.ease_factor.is_finite() {
        params.ease_factor.clamp(sm2.min_ease_factor, sm2.max_ease_factor)
    } else {
        sm2.max_ease_factor
    };

    let (interval, repetitions) = if quality.value() < sm2.passing_quality {
        (1, 0)
    } else {
        let interval = match params.repetitions {
            0 => sm2.first_interval_days,
            1 => sm2.second_interval_days,
            _ => {
                let next = (f64::from(params.interval.max(1)) * prior_ease).round();
                // f64 → u32 转换饱和
                (next as u32).max(1)
            }
        };
        (interval, params.repetitions.saturating_add(1))
    };

    let ease_factor =
        (prior_ease + ease_delta(quality)).clamp(sm2.min_ease_factor, sm2.max_ease_factor);

    tracing::trace!(
        quality = quality.value(),
        prior_interval = params.interval,
        interval,
        repetitions,
        ease_factor,
        "sm2 review applied"
    );

    SpacedRepetitionParams {
        ease_factor,
        interval,
        repetitions,
        next_review_date: add_days(now, interval),
    }
}

/// Derive an SM-2 quality rating from a learning event
pub fn event_to_quality_rating(event: &LearningEvent) -> Quality {
    event_to_quality_rating_with(event, &ScoringParams::default())
}

pub fn event_to_quality_rating_with(event: &LearningEvent, scoring: &ScoringParams) -> Quality {
    let rating = if !event.success {
        match event.partial_credit.unwrap_or(0.0) {
            c if c > 0.5 => 2,
            c if c > 0.0 => 1,
            _ => 0,
        }
    } else {
        match event_score_with(event, scoring) {
            s if s > 0.9 => 5,
            s if s > 0.7 => 4,
            _ => 3,
        }
    };
    // rating 恒在 0..=5
    Quality::new(rating).unwrap_or(Quality::BLACKOUT)
}

//! Aggregate Estimator
//!
//! Combines per-event scores into a mastery level and a confidence value.
//!
//! Mathematical formulas (scores ordered most recent first):
//! - Mastery: M = Σ s_i · d^i / Σ d^i, d = recency decay (0.9)
//! - Confidence: C = 0.4 · min(1, n / 10) + 0.3 · max(0, 1 - σ) + 0.3 · max(0, 1 - Δt / 30)
//!   - σ: population standard deviation of the scores
//!   - Δt: days since the most recent event
//!   - a single event short-circuits to 0.3

use std::cmp::Ordering;

use crate::config::AggregateParams;
use crate::sanitize::clamp_unit;
use crate::types::{LearningEvent, EPSILON};

/// Order events most recent first; equal timestamps fall back to `event_id` ascending
pub fn rank_events(events: &[LearningEvent]) -> Vec<&LearningEvent> {
    let mut ranked: Vec<&LearningEvent> = events.iter().collect();
    ranked.sort_by(|a, b| compare_recency(a, b));
    ranked
}

fn compare_recency(a: &LearningEvent, b: &LearningEvent) -> Ordering {
    b.timestamp
        .cmp(&a.timestamp)
        .then_with(|| a.event_id.cmp(&b.event_id))
}

/// Recency-weighted mean of `scores` (most recent first)
pub fn mastery_level(scores: &[f64], recency_decay: f64) -> f64 {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    let mut weight = 1.0;

    for &score in scores {
        weighted_sum += score * weight;
        total_weight += weight;
        weight *= recency_decay;
    }

    if total_weight > EPSILON {
        clamp_unit(weighted_sum / total_weight)
    } else {
        0.0
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn population_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Confidence in the mastery estimate
///
/// # Arguments
/// * `scores` - Event scores, most recent first
/// * `days_since_last` - Days elapsed since the most recent event
pub fn confidence(scores: &[f64], days_since_last: f64, params: &AggregateParams) -> f64 {
    match scores.len() {
        0 => 0.0,
        1 => clamp_unit(params.single_event_confidence),
        n => {
            let attempt_conf = (n as f64 / f64::from(params.target_attempts)).min(1.0);
            let consistency_conf = (1.0 - population_variance(scores).sqrt()).max(0.0);
            let recency_conf = (1.0 - days_since_last / params.recency_horizon_days).max(0.0);

            clamp_unit(
                attempt_conf * params.attempt_weight
                    + consistency_conf * params.consistency_weight
                    + recency_conf * params.recency_weight,
            )
        }
    }
}

//! Data Sanitization
//!
//! Numerical stability utilities and boundary validation.
//!
//! Functions:
//! - Bounded output sanitization (NaN guard + clamp)
//! - Learning event validation

use crate::error::{MasteryError, Result};
use crate::types::LearningEvent;

/// 检查数组是否包含无效值 (NaN 或 Inf)
pub fn has_invalid_values(arr: &[f64]) -> bool {
    arr.iter().any(|&x| x.is_nan() || x.is_infinite())
}

/// 将概率/等级类输出限制在 [0, 1]，NaN 视为 0
pub fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// 非有限值替换为 0
pub fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// 校验学习事件的字段范围
pub fn validate_event(event: &LearningEvent) -> Result<()> {
    let id = event.event_id.as_str();

    if id.trim().is_empty() {
        return Err(MasteryError::invalid_event(id, "eventId must not be empty"));
    }

    let numeric: Vec<f64> = [
        Some(event.duration),
        event.expected_duration,
        event.score,
        event.partial_credit,
        event.time_to_first_action,
    ]
    .into_iter()
    .flatten()
    .collect();
    if has_invalid_values(&numeric) {
        return Err(MasteryError::invalid_event(
            id,
            "numeric fields must be finite (no NaN or Inf)",
        ));
    }

    if !event.duration.is_finite() || event.duration < 0.0 {
        return Err(MasteryError::invalid_event(
            id,
            format!("duration must be a non-negative number, got {}", event.duration),
        ));
    }
    if let Some(expected) = event.expected_duration {
        if !expected.is_finite() || expected <= 0.0 {
            return Err(MasteryError::invalid_event(
                id,
                format!("expectedDuration must be positive, got {expected}"),
            ));
        }
    }
    if let Some(score) = event.score {
        if !(0.0..=100.0).contains(&score) {
            return Err(MasteryError::invalid_event(
                id,
                format!("score must be within [0, 100], got {score}"),
            ));
        }
    }
    if let Some(credit) = event.partial_credit {
        if !(0.0..=1.0).contains(&credit) {
            return Err(MasteryError::invalid_event(
                id,
                format!("partialCredit must be within [0, 1], got {credit}"),
            ));
        }
    }
    if event.attempt_number == 0 {
        return Err(MasteryError::invalid_event(id, "attemptNumber starts at 1"));
    }
    if let Some(tfa) = event.time_to_first_action {
        if !tfa.is_finite() || tfa < 0.0 {
            return Err(MasteryError::invalid_event(
                id,
                format!("timeToFirstAction must be non-negative, got {tfa}"),
            ));
        }
    }

    Ok(())
}

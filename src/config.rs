//! Engine configuration
//!
//! Every tunable constant of the scorer, estimator, forgetting curve, review
//! schedule and SM-2 scheduler. Defaults reproduce the production constants.

use serde::{Deserialize, Serialize};

use crate::error::{MasteryError, Result};
use crate::types::{DEFAULT_RECENCY_DECAY, MAX_EASE_FACTOR, MIN_EASE_FACTOR, SINGLE_EVENT_CONFIDENCE};

pub const ENV_RECENCY_DECAY: &str = "MASTERY_RECENCY_DECAY";
pub const ENV_TARGET_ATTEMPTS: &str = "MASTERY_TARGET_ATTEMPTS";
pub const ENV_RECENCY_HORIZON_DAYS: &str = "MASTERY_RECENCY_HORIZON_DAYS";
pub const ENV_MIN_STABILITY_DAYS: &str = "MASTERY_MIN_STABILITY_DAYS";
pub const ENV_MAX_STABILITY_DAYS: &str = "MASTERY_MAX_STABILITY_DAYS";
pub const ENV_SM2_MIN_EASE: &str = "MASTERY_SM2_MIN_EASE";
pub const ENV_SM2_MAX_EASE: &str = "MASTERY_SM2_MAX_EASE";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringParams {
    pub max_changes_without_penalty: u32,
    pub changes_penalty: f64,
    pub hint_penalty_per_hint: f64,
    pub min_hint_factor: f64,
    pub retry_penalty_per_attempt: f64,
    pub min_retry_factor: f64,
    /// duration / expected below this is treated as guessing
    pub guessing_ratio: f64,
    pub guessing_penalty: f64,
    /// duration / expected above this is treated as struggling
    pub struggling_ratio: f64,
    pub struggling_penalty: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            max_changes_without_penalty: 2,
            changes_penalty: 0.9,
            hint_penalty_per_hint: 0.1,
            min_hint_factor: 0.5,
            retry_penalty_per_attempt: 0.1,
            min_retry_factor: 0.6,
            guessing_ratio: 0.3,
            guessing_penalty: 0.8,
            struggling_ratio: 3.0,
            struggling_penalty: 0.9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateParams {
    pub recency_decay: f64,
    /// Attempt count at which attempt confidence saturates
    pub target_attempts: u32,
    /// Days after which recency confidence reaches zero
    pub recency_horizon_days: f64,
    pub attempt_weight: f64,
    pub consistency_weight: f64,
    pub recency_weight: f64,
    pub single_event_confidence: f64,
    pub velocity_min_events: usize,
    pub velocity_max_window: usize,
}

impl Default for AggregateParams {
    fn default() -> Self {
        Self {
            recency_decay: DEFAULT_RECENCY_DECAY,
            target_attempts: 10,
            recency_horizon_days: 30.0,
            attempt_weight: 0.4,
            consistency_weight: 0.3,
            recency_weight: 0.3,
            single_event_confidence: SINGLE_EVENT_CONFIDENCE,
            velocity_min_events: 3,
            velocity_max_window: 3,
        }
    }
}

/// Lower bounds (inclusive) on confidence-adjusted mastery
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusThresholds {
    pub mastered: f64,
    pub proficient: f64,
    pub approaching: f64,
}

impl Default for StatusThresholds {
    fn default() -> Self {
        Self {
            mastered: 0.9,
            proficient: 0.7,
            approaching: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgettingParams {
    /// Stability for an event scored 0
    pub min_stability_days: f64,
    /// Stability for an event scored 1
    pub max_stability_days: f64,
}

impl Default for ForgettingParams {
    fn default() -> Self {
        Self {
            min_stability_days: 5.0,
            max_stability_days: 30.0,
        }
    }
}

/// Review interval granted when both mastery and retention exceed the bucket bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewBucket {
    pub min_mastery: f64,
    pub min_retention: f64,
    pub interval_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewSchedule {
    /// Checked in order, first match wins
    pub buckets: Vec<ReviewBucket>,
    pub fallback_interval_days: u32,
}

impl Default for ReviewSchedule {
    fn default() -> Self {
        Self {
            buckets: vec![
                ReviewBucket { min_mastery: 0.9, min_retention: 0.8, interval_days: 21 },
                ReviewBucket { min_mastery: 0.7, min_retention: 0.6, interval_days: 7 },
                ReviewBucket { min_mastery: 0.5, min_retention: 0.4, interval_days: 3 },
            ],
            fallback_interval_days: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Sm2Params {
    pub min_ease_factor: f64,
    pub max_ease_factor: f64,
    pub passing_quality: u8,
    pub first_interval_days: u32,
    pub second_interval_days: u32,
}

impl Default for Sm2Params {
    fn default() -> Self {
        Self {
            min_ease_factor: MIN_EASE_FACTOR,
            max_ease_factor: MAX_EASE_FACTOR,
            passing_quality: 3,
            first_interval_days: 1,
            second_interval_days: 6,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MasteryConfig {
    pub scoring: ScoringParams,
    pub aggregate: AggregateParams,
    pub status: StatusThresholds,
    pub forgetting: ForgettingParams,
    pub review: ReviewSchedule,
    pub sm2: Sm2Params,
}

impl MasteryConfig {
    /// Defaults overridden by `MASTERY_*` variables (a `.env` file is honoured)
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        override_from(&lookup, ENV_RECENCY_DECAY, &mut config.aggregate.recency_decay);
        override_from(&lookup, ENV_TARGET_ATTEMPTS, &mut config.aggregate.target_attempts);
        override_from(
            &lookup,
            ENV_RECENCY_HORIZON_DAYS,
            &mut config.aggregate.recency_horizon_days,
        );
        override_from(
            &lookup,
            ENV_MIN_STABILITY_DAYS,
            &mut config.forgetting.min_stability_days,
        );
        override_from(
            &lookup,
            ENV_MAX_STABILITY_DAYS,
            &mut config.forgetting.max_stability_days,
        );
        override_from(&lookup, ENV_SM2_MIN_EASE, &mut config.sm2.min_ease_factor);
        override_from(&lookup, ENV_SM2_MAX_EASE, &mut config.sm2.max_ease_factor);

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let agg = &self.aggregate;
        if !(agg.recency_decay > 0.0 && agg.recency_decay <= 1.0) {
            return Err(config_error(format!(
                "recency_decay must be in (0, 1], got {}",
                agg.recency_decay
            )));
        }
        if agg.target_attempts == 0 {
            return Err(config_error("target_attempts must be positive"));
        }
        if !(agg.recency_horizon_days > 0.0 && agg.recency_horizon_days.is_finite()) {
            return Err(config_error("recency_horizon_days must be positive"));
        }
        let weight_sum = agg.attempt_weight + agg.consistency_weight + agg.recency_weight;
        if (weight_sum - 1.0).abs() > 1e-6 {
            return Err(config_error(format!(
                "confidence weights must sum to 1, got {weight_sum}"
            )));
        }
        if agg.velocity_max_window == 0 {
            return Err(config_error("velocity_max_window must be positive"));
        }

        let fg = &self.forgetting;
        if !(fg.min_stability_days > 0.0
            && fg.max_stability_days.is_finite()
            && fg.min_stability_days <= fg.max_stability_days)
        {
            return Err(config_error(format!(
                "stability range must be finite and satisfy 0 < min <= max, got [{}, {}]",
                fg.min_stability_days, fg.max_stability_days
            )));
        }

        let st = &self.status;
        if !(st.approaching <= st.proficient && st.proficient <= st.mastered) {
            return Err(config_error("status thresholds must be ascending"));
        }

        let sm2 = &self.sm2;
        // NaN 比较恒为 false，Inf 超出上界，二者均被拒绝
        if !(MIN_EASE_FACTOR <= sm2.min_ease_factor
            && sm2.min_ease_factor <= sm2.max_ease_factor
            && sm2.max_ease_factor <= MAX_EASE_FACTOR)
        {
            return Err(config_error(format!(
                "ease factor range must satisfy {MIN_EASE_FACTOR} <= min <= max <= {MAX_EASE_FACTOR}, got [{}, {}]",
                sm2.min_ease_factor, sm2.max_ease_factor
            )));
        }
        if sm2.first_interval_days == 0 || sm2.second_interval_days == 0 {
            return Err(config_error("SM-2 intervals must be at least one day"));
        }

        if self.review.fallback_interval_days == 0
            || self.review.buckets.iter().any(|b| b.interval_days == 0)
        {
            return Err(config_error("review intervals must be at least one day"));
        }

        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> MasteryError {
    MasteryError::Config(message.into())
}

fn override_from<F, T>(lookup: &F, key: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => *target = value,
        Err(_) => tracing::warn!(key, value = %raw, "ignoring unparsable mastery config override"),
    }
}

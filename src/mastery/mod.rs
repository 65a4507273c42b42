//! Mastery Engine
//!
//! Converts a learner's event history for one skill into a [`MasteryScore`]:
//! - Event Scorer: event → score in [0, 1]
//! - Aggregate Estimator: recency-weighted mastery and confidence
//! - Velocity & Status Classifier: recent vs earlier performance, status label
//! - Forgetting-Curve Estimator: retention and next review date
//!
//! The engine is stateless; every call recomputes from the full history.

pub mod aggregate;
pub mod forgetting;
pub mod scorer;
pub mod velocity;

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::clock::{Clock, SystemClock};
use crate::config::MasteryConfig;
use crate::error::Result;
use crate::sanitize::{clamp_unit, finite_or_zero, validate_event};
use crate::sm2;
use crate::types::{LearningEvent, MasteryScore, Quality, SkillHistory, SpacedRepetitionParams};

pub use aggregate::{confidence, mastery_level, rank_events};
pub use forgetting::{retention, review_interval_days};
pub use scorer::{event_score, event_score_with};
pub use velocity::{classify_status, learning_velocity};

/// Compute a mastery score with the default configuration
pub fn calculate_mastery_score(
    skill_id: &str,
    skill_name: &str,
    events: &[LearningEvent],
    now: DateTime<Utc>,
) -> MasteryScore {
    calculate_with_config(&MasteryConfig::default(), skill_id, skill_name, events, now)
}

pub fn calculate_with_config(
    config: &MasteryConfig,
    skill_id: &str,
    skill_name: &str,
    events: &[LearningEvent],
    now: DateTime<Utc>,
) -> MasteryScore {
    let ranked = rank_events(events);
    let scores: Vec<f64> = ranked
        .iter()
        .map(|e| event_score_with(e, &config.scoring))
        .collect();

    let total_attempts = u32::try_from(ranked.len()).unwrap_or(u32::MAX);
    let successful_attempts =
        u32::try_from(ranked.iter().filter(|e| e.success).count()).unwrap_or(u32::MAX);

    let most_recent = ranked.first().map(|e| e.timestamp);
    let days_since_last = most_recent
        .map(|ts| forgetting::days_between(ts, now))
        .unwrap_or(0.0);

    let mastery = mastery_level(&scores, config.aggregate.recency_decay);
    let conf = confidence(&scores, days_since_last, &config.aggregate);
    let velocity = learning_velocity(&scores, &config.aggregate);
    let status = classify_status(mastery, conf, total_attempts, &config.status);

    let retention_estimate = match scores.first() {
        Some(&last_score) => retention(days_since_last, last_score, &config.forgetting),
        None => 0.0,
    };
    let next_review_date =
        forgetting::next_review_date(now, mastery, retention_estimate, &config.review);

    tracing::debug!(
        skill_id,
        events = total_attempts,
        mastery,
        confidence = conf,
        velocity,
        retention = retention_estimate,
        status = status.as_str(),
        "mastery score computed"
    );

    MasteryScore {
        skill_id: skill_id.to_string(),
        skill_name: skill_name.to_string(),
        mastery_level: clamp_unit(mastery),
        confidence: clamp_unit(conf),
        learning_velocity: finite_or_zero(velocity),
        status,
        total_attempts,
        successful_attempts,
        last_attempt_date: most_recent,
        retention_estimate: clamp_unit(retention_estimate),
        next_review_date,
    }
}

/// Mastery engine bound to a configuration and a clock
///
/// Use cases:
/// - Dashboard / gradebook mastery per skill
/// - Review scheduling (forgetting curve and SM-2)
pub struct MasteryEngine<C: Clock = SystemClock> {
    config: MasteryConfig,
    clock: C,
}

impl MasteryEngine<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(MasteryConfig::default(), SystemClock)
    }

    /// Engine configured from `MASTERY_*` environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self::with_clock(MasteryConfig::from_env()?, SystemClock))
    }
}

impl Default for MasteryEngine<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MasteryEngine<C> {
    pub fn with_clock(config: MasteryConfig, clock: C) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &MasteryConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn score_event(&self, event: &LearningEvent) -> f64 {
        event_score_with(event, &self.config.scoring)
    }

    pub fn calculate_mastery_score(
        &self,
        skill_id: &str,
        skill_name: &str,
        events: &[LearningEvent],
    ) -> MasteryScore {
        calculate_with_config(&self.config, skill_id, skill_name, events, self.clock.now())
    }

    /// Like [`calculate_mastery_score`](Self::calculate_mastery_score) but rejects
    /// out-of-range events instead of trusting upstream validation
    pub fn try_calculate_mastery_score(
        &self,
        skill_id: &str,
        skill_name: &str,
        events: &[LearningEvent],
    ) -> Result<MasteryScore> {
        for event in events {
            if let Err(err) = validate_event(event) {
                tracing::warn!(skill_id, error = %err, "rejecting learning event");
                return Err(err);
            }
        }
        Ok(self.calculate_mastery_score(skill_id, skill_name, events))
    }

    /// Score many skills in parallel against a single `now`
    ///
    /// Output order matches `histories`.
    pub fn calculate_batch(&self, histories: &[SkillHistory]) -> Vec<MasteryScore> {
        let now = self.clock.now();
        tracing::debug!(skills = histories.len(), "batch mastery computation");

        histories
            .par_iter()
            .map(|h| calculate_with_config(&self.config, &h.skill_id, &h.skill_name, &h.events, now))
            .collect()
    }

    pub fn update_spaced_repetition(
        &self,
        params: &SpacedRepetitionParams,
        quality: Quality,
    ) -> SpacedRepetitionParams {
        sm2::update_spaced_repetition_with(params, quality, self.clock.now(), &self.config.sm2)
    }

    pub fn event_to_quality_rating(&self, event: &LearningEvent) -> Quality {
        sm2::event_to_quality_rating_with(event, &self.config.scoring)
    }

    /// Fresh SM-2 state for a skill seen for the first time
    pub fn initial_spaced_repetition(&self) -> SpacedRepetitionParams {
        let mut params = SpacedRepetitionParams::new(self.clock.now());
        params.ease_factor = self.config.sm2.max_ease_factor;
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::types::{BlockType, MasteryStatus};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
    }

    fn engine() -> MasteryEngine<FixedClock> {
        MasteryEngine::with_clock(MasteryConfig::default(), FixedClock::new(now()))
    }

    fn event(id: &str, days_ago: i64, success: bool, score: f64) -> LearningEvent {
        LearningEvent::new(
            id,
            "block-1",
            BlockType::Quiz,
            now() - Duration::days(days_ago),
            60.0,
            success,
        )
        .with_score(score)
    }

    #[test]
    fn test_empty_history() {
        let score = engine().calculate_mastery_score("s1", "Fractions", &[]);
        assert_eq!(score.mastery_level, 0.0);
        assert_eq!(score.confidence, 0.0);
        assert_eq!(score.learning_velocity, 0.0);
        assert_eq!(score.status, MasteryStatus::NotStarted);
        assert_eq!(score.total_attempts, 0);
        assert_eq!(score.successful_attempts, 0);
        assert_eq!(score.retention_estimate, 0.0);
        assert!(score.last_attempt_date.is_none());
        assert_eq!(score.next_review_date, now() + Duration::days(1));
    }

    #[test]
    fn test_single_recent_event() {
        let e = event("e1", 0, true, 95.0).with_expected_duration(60.0);
        let score = engine().calculate_mastery_score("s1", "Fractions", &[e]);
        assert!((score.mastery_level - 0.95).abs() < 1e-12);
        assert!((score.confidence - 0.3).abs() < 1e-12);
        assert_eq!(score.status, MasteryStatus::Approaching);
        assert!((score.retention_estimate - 1.0).abs() < 1e-12);
        assert_eq!(score.next_review_date, now() + Duration::days(21));
        assert_eq!(score.last_attempt_date, Some(now()));
    }

    #[test]
    fn test_counts_and_last_attempt() {
        let events = vec![
            event("e1", 3, false, 0.0),
            event("e2", 1, true, 80.0),
            event("e3", 2, true, 70.0),
        ];
        let score = engine().calculate_mastery_score("s1", "Fractions", &events);
        assert_eq!(score.total_attempts, 3);
        assert_eq!(score.successful_attempts, 2);
        assert_eq!(score.last_attempt_date, Some(now() - Duration::days(1)));
        // newest 0.8 vs oldest 0.0
        assert!((score.learning_velocity - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_input_order_irrelevant() {
        let mut events = vec![
            event("e1", 5, true, 40.0),
            event("e2", 4, true, 60.0),
            event("e3", 1, true, 90.0),
            event("e4", 1, false, 0.0),
        ];
        let a = engine().calculate_mastery_score("s", "S", &events);
        events.reverse();
        let b = engine().calculate_mastery_score("s", "S", &events);
        assert_eq!(a, b);
    }

    #[test]
    fn test_try_calculate_rejects_invalid() {
        let bad = event("bad", 0, true, 140.0);
        let result = engine().try_calculate_mastery_score("s", "S", &[event("ok", 1, true, 50.0), bad]);
        assert!(result.is_err());

        let ok = engine().try_calculate_mastery_score("s", "S", &[event("ok", 1, true, 50.0)]);
        assert!(ok.is_ok());
    }

    #[test]
    fn test_batch_matches_sequential() {
        let histories: Vec<SkillHistory> = (0..16)
            .map(|i| SkillHistory {
                skill_id: format!("skill-{i}"),
                skill_name: format!("Skill {i}"),
                events: (0..i)
                    .map(|j| event(&format!("e{j}"), j as i64, j % 3 != 0, 50.0 + j as f64))
                    .collect(),
            })
            .collect();

        let e = engine();
        let batch = e.calculate_batch(&histories);
        assert_eq!(batch.len(), histories.len());
        for (h, s) in histories.iter().zip(batch.iter()) {
            assert_eq!(s, &e.calculate_mastery_score(&h.skill_id, &h.skill_name, &h.events));
        }
    }

    #[test]
    fn test_engine_sm2_uses_clock() {
        let e = engine();
        let params = e.initial_spaced_repetition();
        assert!(params.is_due(now()));
        let next = e.update_spaced_repetition(&params, Quality::PERFECT);
        assert_eq!(next.interval, 1);
        assert_eq!(next.next_review_date, now() + Duration::days(1));
    }

    #[test]
    fn test_engine_scores_event_with_its_config() {
        let e = event("e", 0, true, 80.0);
        assert!((engine().score_event(&e) - 0.8).abs() < 1e-12);

        let mut config = MasteryConfig::default();
        config.scoring.hint_penalty_per_hint = 0.25;
        let strict = MasteryEngine::with_clock(config, FixedClock::new(now()));
        let hinted = LearningEvent { hints_used: 1, ..e };
        assert!((strict.score_event(&hinted) - 0.8 * 0.75).abs() < 1e-12);
        assert!((engine().score_event(&hinted) - 0.8 * 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_engine_quality_rating() {
        let e = engine();
        assert_eq!(e.event_to_quality_rating(&event("e", 0, true, 95.0)).value(), 5);
        assert_eq!(e.event_to_quality_rating(&event("e", 0, false, 0.0)).value(), 0);
    }
}

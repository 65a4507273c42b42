//! Common Types and Constants
//!
//! Shared data structures used across the mastery and spaced-repetition modules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::MasteryError;

// ==================== Constants ====================

/// Milliseconds in one day
pub const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Numerical stability epsilon
pub const EPSILON: f64 = 1e-10;

/// Per-step recency decay for the weighted mastery average
pub const DEFAULT_RECENCY_DECAY: f64 = 0.9;

/// Confidence reported when only one event is available
pub const SINGLE_EVENT_CONFIDENCE: f64 = 0.3;

/// SM-2 ease factor floor
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// SM-2 ease factor ceiling (also the initial value)
pub const MAX_EASE_FACTOR: f64 = 2.5;

/// Highest SM-2 quality rating
pub const MAX_QUALITY: u8 = 5;

// ==================== Learning Events ====================

/// Kind of content block an event was recorded on
///
/// Unrecognized tags are kept verbatim in `Other` and serialize back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockType {
    Text,
    Image,
    Carousel,
    BranchingScenario,
    Quiz,
    Video,
    Audio,
    Interactive,
    Other(String),
}

impl BlockType {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "text" => BlockType::Text,
            "image" => BlockType::Image,
            "carousel" => BlockType::Carousel,
            "branching_scenario" => BlockType::BranchingScenario,
            "quiz" => BlockType::Quiz,
            "video" => BlockType::Video,
            "audio" => BlockType::Audio,
            "interactive" => BlockType::Interactive,
            other => BlockType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BlockType::Text => "text",
            BlockType::Image => "image",
            BlockType::Carousel => "carousel",
            BlockType::BranchingScenario => "branching_scenario",
            BlockType::Quiz => "quiz",
            BlockType::Video => "video",
            BlockType::Audio => "audio",
            BlockType::Interactive => "interactive",
            BlockType::Other(tag) => tag,
        }
    }
}

impl Serialize for BlockType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BlockType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(BlockType::from_tag(&tag))
    }
}

fn default_attempt_number() -> u32 {
    1
}

/// One observed learner interaction with a content block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningEvent {
    pub event_id: String,
    pub block_id: String,
    pub block_type: BlockType,
    pub timestamp: DateTime<Utc>,
    /// Seconds spent on the block
    pub duration: f64,
    /// Baseline seconds for the block, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_duration: Option<f64>,
    pub success: bool,
    /// Score in [0, 100]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Credit in [0, 1], only read when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_credit: Option<f64>,
    #[serde(default)]
    pub number_of_changes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_to_first_action: Option<f64>,
    #[serde(default = "default_attempt_number")]
    pub attempt_number: u32,
    #[serde(default)]
    pub hints_used: u32,
}

impl LearningEvent {
    /// Create an event with every optional signal left at its default
    pub fn new(
        event_id: impl Into<String>,
        block_id: impl Into<String>,
        block_type: BlockType,
        timestamp: DateTime<Utc>,
        duration: f64,
        success: bool,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            block_id: block_id.into(),
            block_type,
            timestamp,
            duration,
            expected_duration: None,
            success,
            score: None,
            partial_credit: None,
            number_of_changes: 0,
            time_to_first_action: None,
            attempt_number: default_attempt_number(),
            hints_used: 0,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_partial_credit(mut self, credit: f64) -> Self {
        self.partial_credit = Some(credit);
        self
    }

    pub fn with_expected_duration(mut self, seconds: f64) -> Self {
        self.expected_duration = Some(seconds);
        self
    }
}

// ==================== Mastery Output ====================

/// Discrete mastery classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryStatus {
    NotStarted,
    Developing,
    Approaching,
    Proficient,
    Mastered,
}

impl MasteryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MasteryStatus::NotStarted => "not_started",
            MasteryStatus::Developing => "developing",
            MasteryStatus::Approaching => "approaching",
            MasteryStatus::Proficient => "proficient",
            MasteryStatus::Mastered => "mastered",
        }
    }
}

/// Mastery estimate for one (learner, skill) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryScore {
    pub skill_id: String,
    pub skill_name: String,
    /// Weighted proficiency estimate [0, 1]
    pub mastery_level: f64,
    /// Reliability of the estimate [0, 1]
    pub confidence: f64,
    /// Recent minus earlier performance, positive = improving
    pub learning_velocity: f64,
    pub status: MasteryStatus,
    pub total_attempts: u32,
    pub successful_attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_attempt_date: Option<DateTime<Utc>>,
    /// Estimated recall probability [0, 1]
    pub retention_estimate: f64,
    pub next_review_date: DateTime<Utc>,
}

/// Event history of one skill, input to batch computation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillHistory {
    pub skill_id: String,
    pub skill_name: String,
    pub events: Vec<LearningEvent>,
}

// ==================== SM-2 Types ====================

/// SM-2 review quality, 0 (blackout) to 5 (perfect recall)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const BLACKOUT: Quality = Quality(0);
    pub const PERFECT: Quality = Quality(MAX_QUALITY);

    pub fn new(value: u8) -> Result<Self, MasteryError> {
        if value > MAX_QUALITY {
            return Err(MasteryError::InvalidQuality(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Quality {
    type Error = MasteryError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Quality::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

/// Caller-persisted SM-2 state for one (learner, skill) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpacedRepetitionParams {
    /// Ease factor [1.3, 2.5]
    pub ease_factor: f64,
    /// Current interval in days (>= 1)
    pub interval: u32,
    /// Consecutive successful reviews
    pub repetitions: u32,
    pub next_review_date: DateTime<Utc>,
}

impl SpacedRepetitionParams {
    /// Fresh state, due immediately
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            ease_factor: MAX_EASE_FACTOR,
            interval: 1,
            repetitions: 0,
            next_review_date: now,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_review_date
    }
}

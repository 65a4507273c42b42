use thiserror::Error;

#[derive(Debug, Error)]
pub enum MasteryError {
    #[error("invalid event {event_id}: {reason}")]
    InvalidEvent { event_id: String, reason: String },
    #[error("quality rating must be within 0..=5, got {0}")]
    InvalidQuality(u8),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MasteryError {
    pub(crate) fn invalid_event(event_id: &str, reason: impl Into<String>) -> Self {
        Self::InvalidEvent {
            event_id: event_id.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MasteryError>;

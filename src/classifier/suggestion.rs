use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Why no next service date could be projected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SuggestionUnavailable {
    #[error("No activity history")]
    NoActivity,
    #[error("No service frequency")]
    NoFrequency,
    #[error("No completed activities")]
    NoCompletedActivity,
    #[error("Unknown frequency '{0}'")]
    UnknownFrequency(String),
    #[error("No future date within {0} cadence steps")]
    StepLimitExceeded(u32),
}

/// Serializable form of a suggestion result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Suggestion {
    Available { date: DateTime<Utc> },
    Unavailable { reason: String },
}

impl Suggestion {
    pub fn date(&self) -> Option<DateTime<Utc>> {
        match self {
            Suggestion::Available { date } => Some(*date),
            Suggestion::Unavailable { .. } => None,
        }
    }
}

impl From<Result<DateTime<Utc>, SuggestionUnavailable>> for Suggestion {
    fn from(value: Result<DateTime<Utc>, SuggestionUnavailable>) -> Self {
        match value {
            Ok(date) => Suggestion::Available { date },
            Err(reason) => Suggestion::Unavailable {
                reason: reason.to_string(),
            },
        }
    }
}

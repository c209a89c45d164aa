//! Domain errors for the cardsignal prediction engine.

use thiserror::Error;

/// Domain-level errors that can occur while tracking predictions.
///
/// Parse misses are deliberately absent: a message without a game number,
/// metric or point value is "no signal", never an error.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid tunable {name}: {value}. Must be between {min} and {max}")]
    InvalidTunable {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Transport error: {0}")]
    TransportFailed(String),

    #[error("Store error: {0}")]
    StoreFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Schedule import failed at line {line}: {reason}")]
    ScheduleImport { line: usize, reason: String },
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_yaml::Error> for DomainError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        Self::StoreFailed(err.to_string())
    }
}

//! Error types for the school calendar core.

use thiserror::Error;

/// Errors raised while normalizing event data or loading configuration.
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Unknown month name: '{0}'")]
    UnknownMonth(String),

    #[error("Month index out of range: {0} (expected 0-11)")]
    InvalidMonthIndex(u32),

    #[error("Malformed day field '{field}': {reason}")]
    MalformedDay { field: String, reason: String },

    #[error("Invalid date '{0}'")]
    InvalidDate(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CalendarError {
    pub(crate) fn malformed_day(field: &str, reason: impl Into<String>) -> Self {
        CalendarError::MalformedDay {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for calendar operations.
pub type CalendarResult<T> = Result<T, CalendarError>;

/// The event source could not deliver a month's records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Event source returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Event source unreachable: {0}")]
    Transport(String),

    #[error("Could not decode event source response: {0}")]
    Decode(String),
}

/// Result type alias for event source calls.
pub type SourceResult<T> = Result<T, SourceError>;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("No appointments configured for calendar '{0}'")]
    UnknownCalendar(String),

    #[error("Could not parse date: \"{0}\"")]
    UnparseableDate(String),

    #[error("Cannot handle repeat interval: {0}")]
    InvalidCadence(String),

    #[error("Unknown date pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("{0}")]
    InvalidTimezone(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

use thiserror::Error;

/// Failure of a whole decode call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// Failure to map a single row or match. Batch decoders drop the row.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("Missing cell {0}")]
    MissingCell(usize),
    #[error("Missing field `{0}`")]
    MissingField(String),
    #[error("Invalid number in `{field}`: {value:?}")]
    InvalidNumber { field: String, value: String },
    #[error("Invalid row: {0}")]
    Invalid(String),
}

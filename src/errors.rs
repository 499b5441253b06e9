//! Error types for tuflow_review
//!
//! Every structural input problem is surfaced to the caller as a typed
//! variant. Nothing here retries or guesses a value.

use thiserror::Error;

/// Main error type for log review and convergence analysis
#[derive(Error, Debug)]
pub enum ReviewError {
    /// Series shorter than one full window plus the sample under test
    #[error("Insufficient data: {samples} samples, at least {required} required")]
    InsufficientData { samples: usize, required: usize },

    /// Malformed abbreviated-magnitude volume string
    #[error("Invalid volume '{value}': {reason}")]
    Format { value: String, reason: String },

    /// Column length disagrees with the time column
    #[error("Column '{column}' has {actual} samples but the time column has {expected}")]
    MisalignedSeries {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Time column is not strictly ascending
    #[error("Time column is not strictly ascending at index {index}")]
    UnorderedTime { index: usize },

    /// Sample representation does not match the column category
    #[error("Column '{column}' must hold {expected} samples")]
    ColumnKind { column: String, expected: String },

    /// Simulation log could not be parsed
    #[error("Log parse error at line {line}: {reason}")]
    LogParse { line: usize, reason: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV writer errors
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("Review error: {0}")]
    Generic(String),
}

impl ReviewError {
    /// Shorthand for a volume format error
    pub fn format(value: &str, reason: impl Into<String>) -> Self {
        ReviewError::Format {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for review operations
pub type Result<T> = std::result::Result<T, ReviewError>;

//! Error types for the data-loader crate.
//!
//! Every failure while reading the activity catalog, user profiles or the
//! interaction log surfaces as a [`DataLoadError`].

use thiserror::Error;

/// Errors that can occur during data loading, parsing and logging
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading or appending
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in a CSV file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Row has fewer fields than the header requires
    #[error("Expected {expected} fields but found {found} in line {line}")]
    FieldCountMismatch {
        expected: usize,
        found: usize,
        line: usize,
    },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;

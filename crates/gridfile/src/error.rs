//! Error types for gridfile reading.

use thiserror::Error;

/// Result type for gridfile operations.
pub type GridFileResult<T> = Result<T, GridFileError>;

/// Error types for gridfile reading.
#[derive(Error, Debug)]
pub enum GridFileError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Missing required variable or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Time axis could not be decoded
    #[error("Invalid time units: {0}")]
    InvalidTimeUnits(String),
}

//! Error types for the ingestion crate.

use gridfile::GridFileError;
use storage::StorageError;
use thiserror::Error;

/// Errors that can occur during ingestion and reporting.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Failed to read gridfile: {0}")]
    GridFile(#[from] GridFileError),

    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),

    #[error("Missing required metadata: {0}")]
    MissingMetadata(String),

    #[error("Inconsistent dataset: {0}")]
    InconsistentDataset(String),

    #[error("Stat not found: {0}")]
    StatNotFound(String),
}

impl IngestionError {
    /// Storage failures abort a batch; everything else only affects one file.
    pub fn is_storage(&self) -> bool {
        matches!(self, IngestionError::Storage(_))
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;

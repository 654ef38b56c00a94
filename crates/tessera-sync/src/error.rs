//! Error types for the sync crate.

use std::path::PathBuf;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while reading, writing or converting notebooks.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Failed to read source file.
    #[error("Failed to read file {path}: {message}")]
    ReadError { path: PathBuf, message: String },

    /// Failed to write output file.
    #[error("Failed to write file {path}: {message}")]
    WriteError { path: PathBuf, message: String },

    /// Failed to parse a document.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize/deserialize JSON.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid notebook structure.
    #[error("Invalid notebook: {0}")]
    InvalidNotebook(String),

    /// No serializer for this file extension.
    #[error("Unsupported notebook format: {0}")]
    UnsupportedFormat(PathBuf),

    /// The store has no saved notebook to operate on.
    #[error("Notebook has not been saved yet")]
    Unsaved,
}

impl From<SyncError> for tessera_core::Error {
    fn from(err: SyncError) -> Self {
        use tessera_core::Error;

        match err {
            SyncError::ReadError { .. } => Error::Load(err.to_string()),
            SyncError::WriteError { .. } | SyncError::Unsaved => Error::Store(err.to_string()),
            SyncError::ParseError(_)
            | SyncError::JsonError(_)
            | SyncError::InvalidNotebook(_)
            | SyncError::UnsupportedFormat(_) => Error::Deserialization(err.to_string()),
            SyncError::IoError(e) => Error::Io(e),
        }
    }
}

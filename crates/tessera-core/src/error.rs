//! Error types for tessera-core.

use thiserror::Error;

use crate::cell::CellKey;

/// Result type for tessera-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tessera-core.
///
/// None of these are fatal to a notebook: the orchestrator maps each one to a
/// fixed recovery (navigate away, skip, or ignore).
#[derive(Debug, Error)]
pub enum Error {
    /// The persisted representation could not be fetched.
    #[error("load failed: {0}")]
    Load(String),

    /// The persisted store rejected a save or fork.
    #[error("store error: {0}")]
    Store(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// A cell's source failed inside the execution context.
    #[error("execution error: {0}")]
    Execution(String),

    /// A full-notebook run is already in progress.
    #[error("execution already in progress")]
    ExecutionInProgress,

    /// The execution context was released and accepts no more work.
    #[error("execution context released")]
    Released,

    /// Cell not found.
    #[error("cell not found: {0}")]
    CellNotFound(CellKey),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

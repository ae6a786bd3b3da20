//! Error types for mnemo-core

use thiserror::Error;

/// Main error type for mnemo-core
///
/// A missing key is not represented here: lookups return `Option` and
/// deletions return [`DeleteOutcome`](crate::memory::DeleteOutcome).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Storage unavailable at '{path}': {source}")]
    StorageUnavailable {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to {operation} memory: {source}")]
    StorageWrite {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Failed to {operation} memories: {source}")]
    StorageRead {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("External service error: {0}")]
    ExternalCollaborator(String),

    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Name of the store operation that failed, if this is a storage fault
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::StorageWrite { operation, .. } | Self::StorageRead { operation, .. } => {
                Some(operation)
            }
            _ => None,
        }
    }
}

/// Result type alias for mnemo-core
pub type Result<T> = std::result::Result<T, Error>;

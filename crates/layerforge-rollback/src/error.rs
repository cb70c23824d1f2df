//! Error types for journaling and rollback

use std::path::PathBuf;

/// Errors that can occur while journaling or rolling back changes
#[derive(Debug, thiserror::Error)]
pub enum RollbackError {
    /// Journal file not found at the specified path
    #[error("Journal not found: {0}")]
    JournalNotFound(PathBuf),

    /// Journal content could not be parsed
    #[error("Journal serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Committing a transaction to the journal store failed
    #[error("Commit failed: {0}")]
    CommitFailed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

//! Store error types.

use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A refresh failed; previous data is kept.
    #[error("{0}")]
    UpdateFailed(String),

    /// Refresh already in progress.
    #[error("Refresh already in progress for {0}")]
    RefreshInProgress(String),

    /// Config entry not found.
    #[error("Config entry not found: {0}")]
    EntryNotFound(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::UpdateFailed(_) | StoreError::RefreshInProgress(_) | StoreError::Io(_)
        )
    }
}

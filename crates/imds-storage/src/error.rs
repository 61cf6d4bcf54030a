//! Storage error types.
//!
//! Every variant carries the vendor name or row id involved so a log line
//! is enough to diagnose the failure.

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to open or migrate the backing database.
    #[error("failed to open storage at '{source_name}': {reason}")]
    Open { source_name: String, reason: String },

    /// No live row matched the lookup.
    #[error("vendor '{name}' not found")]
    NotFound { name: String },

    /// A live row with the same name already exists.
    #[error("vendor '{name}' already exists")]
    Conflict { name: String },

    /// Failed to read a row.
    #[error("failed to read vendor '{name}': {reason}")]
    Read { name: String, reason: String },

    /// Failed to insert or update a row.
    #[error("failed to write vendor '{name}': {reason}")]
    Write { name: String, reason: String },

    /// Failed to soft-delete a row.
    #[error("failed to delete vendor row {id}: {reason}")]
    Delete { id: i64, reason: String },

    /// The backend did not answer a ping.
    #[error("storage unreachable: {reason}")]
    Unreachable { reason: String },

    /// The request deadline elapsed before the operation finished.
    #[error("{operation} timed out")]
    Timeout { operation: &'static str },

    /// The operation was abandoned because the server is shutting down.
    #[error("{operation} cancelled")]
    Cancelled { operation: &'static str },
}

impl StorageError {
    /// Whether this error means "no such row" rather than a backend failure.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

//! Error types for `imds-core`.
//!
//! Each error is classified once, where it is detected: the server maps
//! every variant to exactly one HTTP status without inspecting causes.

use imds_storage::StorageError;

/// Errors from converting vendor document bodies to and from bytes.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The value could not be serialized.
    #[error("failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),

    /// Non-empty bytes were not valid JSON for the requested type.
    #[error("failed to decode document: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Errors from the vendor document store.
#[derive(Debug, thiserror::Error)]
pub enum VendorError {
    /// A required field was missing or empty.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// A live document with this name already exists.
    #[error("vendor data '{name}' already exists")]
    AlreadyExists { name: String },

    /// No live document has this name.
    #[error("vendor data '{name}' not found")]
    NotFound { name: String },

    /// The backing store failed, timed out, or was cancelled.
    #[error("store unavailable during {operation}: {source}")]
    StoreUnavailable {
        operation: &'static str,
        #[source]
        source: StorageError,
    },

    /// The caller-supplied body could not be encoded.
    #[error("invalid vendor data format: {0}")]
    Encoding(#[source] CodecError),

    /// Bytes already in the store are not valid JSON.
    #[error("stored vendor data '{name}' is corrupt: {source}")]
    CorruptDocument {
        name: String,
        #[source]
        source: CodecError,
    },
}

/// Errors from rendering a served document.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// JSON serialization failed.
    #[error("json rendering failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization failed.
    #[error("yaml rendering failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document has no shell-script form.
    #[error("{document} cannot be rendered as a shell script")]
    NoScriptForm { document: &'static str },
}

use std::path::PathBuf;

use thiserror::Error;

/// Keel error types
#[derive(Error, Debug)]
pub enum KeelError {
    /// No container with this id in either the container or the infra table
    #[error("container with id: {0} not found")]
    NotFound(String),

    /// Container record exists but has no live state
    #[error("container {0} state is nil")]
    InvalidState(String),

    /// Archive could not be unpacked into a workspace
    #[error("Extraction failed for {archive}: {source}")]
    ExtractionError {
        archive: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Operation received an image reference of the wrong transport
    #[error("Reference type error: expected {expected}, got {actual}")]
    ReferenceTypeError { expected: String, actual: String },

    /// Image reference string could not be parsed
    #[error("Invalid image reference: {0}")]
    InvalidReference(String),

    /// Digest string is not of the form `<algorithm>:<encoded>`
    #[error("Invalid digest: {0}")]
    InvalidDigest(String),

    /// Failure reported by an image source backend
    #[error("Image source error: {0}")]
    SourceError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Temporary directory could not be removed
    #[error("Failed to delete temp directory {path}: {source}")]
    CleanupError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Construction failed and the rollback of the workspace failed too
    #[error("{source} (deleting temp directory {path} also failed: {cleanup})")]
    RollbackError {
        path: PathBuf,
        source: Box<KeelError>,
        cleanup: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<serde_json::Error> for KeelError {
    fn from(err: serde_json::Error) -> Self {
        KeelError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for KeelError {
    fn from(err: serde_yaml::Error) -> Self {
        KeelError::SerializationError(err.to_string())
    }
}

/// Result type alias for Keel operations
pub type Result<T> = std::result::Result<T, KeelError>;

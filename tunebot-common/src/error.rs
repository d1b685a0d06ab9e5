//! Common error types for tunebot

use thiserror::Error;

/// Common result type for tunebot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across tunebot crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session identifier does not have the `<adapter>-<kind>_<id>` shape
    #[error("Invalid chat key format: {0}")]
    InvalidFormat(String),

    /// Cover size outside the supported set
    #[error("Invalid cover size {0}: must be one of 0, 150, 300, 500, 800")]
    InvalidSize(u32),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Persisted credential exists but cannot be decoded
    #[error("Corrupt credential: {0}")]
    CorruptCredential(String),

    /// Every quality tier was tried and none produced a playable URL
    #[error("No playable URL in any quality tier (last error: {last_error})")]
    AllQualitiesExhausted { last_error: String },

    /// Credential carries no refresh material
    #[error("Credential does not support refresh")]
    RefreshUnsupported,

    /// Refresh call to the music service failed
    #[error("Credential refresh failed: {0}")]
    RefreshFailed(String),

    /// Refresh succeeded but writing the new credential failed
    #[error("Credential refreshed but not persisted: {0}")]
    RefreshedNotPersisted(String),

    /// Opaque failure from the music service or chat transport
    #[error("Upstream error: {0}")]
    Upstream(String),
}

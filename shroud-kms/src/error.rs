//! Key store error types.

use thiserror::Error;

/// Result type for key store operations.
pub type KmsResult<T> = Result<T, KmsError>;

/// Errors from the key store.
#[derive(Debug, Error)]
pub enum KmsError {
    /// The subject was forgotten or never existed on this cluster.
    /// Callers decide whether to treat this as a tombstone or an error.
    #[error("decrypting material for subject {subject} was not found")]
    DecryptingMaterialNotFound { subject: String },

    /// The materialized view never caught up with the command log.
    /// Fatal for the process.
    #[error("key store did not catch up with the command log within {timeout_ms} ms")]
    StartupTimeout { timeout_ms: u64 },

    /// Transient failure of the underlying log client.
    #[error("key store unavailable: {detail}")]
    Unavailable { detail: String },

    #[error("command serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

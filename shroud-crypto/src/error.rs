//! Crypto layer error types.

use thiserror::Error;

/// Result type for cipher and key-generation operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors from the cipher adapter.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid iv length: expected {expected} bytes, got {actual}")]
    InvalidIvLength { expected: usize, actual: usize },

    #[error("unsupported cipher algorithm: {algorithm}")]
    UnsupportedAlgorithm { algorithm: String },

    #[error("authenticated {operation} failed (wrong key or tampered data)")]
    AeadFailure { operation: &'static str },
}

//! Pipeline error types.

use shroud_crypto::CryptoError;
use shroud_kms::KmsError;
use shroud_schema::SchemaError;
use thiserror::Error;

/// Result type for pipeline operations.
pub type SerdeResult<T> = Result<T, SerdeError>;

/// Errors surfaced by the serialization pipeline.
///
/// Locator errors abort a serialize call before any cipher work; cipher
/// and KMS errors abort it afterwards. Either way the caller's record
/// value is left unchanged, since redaction operates on a copy.
#[derive(Debug, Error)]
pub enum SerdeError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Kms(#[from] KmsError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("schema id {id} is not registered")]
    SchemaNotFound { id: u32 },

    #[error("envelope in schema {schema} references unknown field tag {tag}")]
    UnknownFieldTag { schema: String, tag: u32 },

    #[error("invalid envelope: {detail}")]
    InvalidEnvelope { detail: String },
}

//! Provider capability traits.
//!
//! Encrypting and decrypting are separate capabilities; a single
//! component may implement both. The pipeline only ever depends on
//! `Arc<dyn ...Provider>` and never sees raw view state.

use crate::error::KmsResult;
use async_trait::async_trait;
use shroud_types::{SubjectId, SymmetricMaterial};

/// Supplies key material for the serialize path.
#[async_trait]
pub trait EncryptingMaterialsProvider: Send + Sync {
    /// Returns the subject's existing material or creates one.
    ///
    /// May issue network I/O; callers await the result and hold the
    /// returned material for the lifetime of the serialize call.
    async fn encryption_key_for(&self, subject: &SubjectId) -> KmsResult<SymmetricMaterial>;
}

/// Supplies key material for the deserialize path.
#[async_trait]
pub trait DecryptingMaterialsProvider: Send + Sync {
    /// Returns the subject's current material, never creating one.
    ///
    /// Fails with [`crate::KmsError::DecryptingMaterialNotFound`] when
    /// the subject is unknown on this cluster or has been forgotten.
    async fn decryption_key_for(&self, subject: &SubjectId) -> KmsResult<SymmetricMaterial>;
}

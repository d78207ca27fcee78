//! Development in-memory key management.

use crate::error::{KmsError, KmsResult};
use crate::provider::{DecryptingMaterialsProvider, EncryptingMaterialsProvider};
use async_trait::async_trait;
use shroud_crypto::{Aes256KeyGen, KeyGenerator};
use shroud_types::{SubjectId, SymmetricMaterial};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-local key management for development and tests.
///
/// Not distributed: keys are not visible to other nodes, so this must
/// never back a production deployment. State lives with the instance
/// and is gone when it drops.
pub struct InMemoryKms {
    key_generator: Arc<dyn KeyGenerator>,
    keys: Arc<RwLock<HashMap<SubjectId, SymmetricMaterial>>>,
}

impl InMemoryKms {
    pub fn new() -> Self {
        Self::with_key_generator(Arc::new(Aes256KeyGen))
    }

    pub fn with_key_generator(key_generator: Arc<dyn KeyGenerator>) -> Self {
        Self {
            key_generator,
            keys: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Erases a subject's material, returning it if present.
    pub async fn forget(&self, subject: &SubjectId) -> Option<SymmetricMaterial> {
        self.keys.write().await.remove(subject)
    }

    pub async fn len(&self) -> usize {
        self.keys.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.keys.read().await.is_empty()
    }
}

impl Default for InMemoryKms {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EncryptingMaterialsProvider for InMemoryKms {
    async fn encryption_key_for(&self, subject: &SubjectId) -> KmsResult<SymmetricMaterial> {
        let mut keys = self.keys.write().await;
        let material = keys
            .entry(subject.clone())
            .or_insert_with(|| self.key_generator.generate());
        Ok(material.clone())
    }
}

#[async_trait]
impl DecryptingMaterialsProvider for InMemoryKms {
    async fn decryption_key_for(&self, subject: &SubjectId) -> KmsResult<SymmetricMaterial> {
        self.keys
            .read()
            .await
            .get(subject)
            .cloned()
            .ok_or_else(|| KmsError::DecryptingMaterialNotFound {
                subject: subject.to_string(),
            })
    }
}

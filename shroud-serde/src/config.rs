//! Pipeline configuration.

use crate::error::SerdeResult;
use serde::{Deserialize, Serialize};
use shroud_crypto::{AesGcmCipher, Cipher, CryptoError, AES_GCM_ALGORITHM};
use shroud_kms::KeyStoreConfig;
use std::sync::Arc;

/// Configuration for the GDPR-aware pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Forwarded to the schema registry (`schema.registry.url`).
    pub registry_url: String,

    /// Whether serialize registers the record's schema on first use
    /// (`schema.registry.auto_register`).
    pub auto_register_schemas: bool,

    /// Algorithm of the default cipher adapter (`cipher.algorithm`).
    /// Must name an authenticated mode.
    pub cipher_algorithm: String,

    /// Key store settings for providers built from this config.
    pub key_store: KeyStoreConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            registry_url: "http://localhost:8081".to_string(),
            auto_register_schemas: true,
            cipher_algorithm: AES_GCM_ALGORITHM.to_string(),
            key_store: KeyStoreConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Builds the cipher adapter named by `cipher.algorithm`.
    pub fn build_cipher(&self) -> SerdeResult<Arc<dyn Cipher>> {
        if self.cipher_algorithm == AES_GCM_ALGORITHM {
            Ok(Arc::new(AesGcmCipher))
        } else {
            Err(CryptoError::UnsupportedAlgorithm {
                algorithm: self.cipher_algorithm.clone(),
            }
            .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cipher_is_authenticated_aes() {
        let config = PipelineConfig::default();
        assert!(config.build_cipher().is_ok());
    }

    #[test]
    fn unauthenticated_mode_is_rejected() {
        let config = PipelineConfig {
            cipher_algorithm: "AES/256/CBC/PKCS5Padding".to_string(),
            ..PipelineConfig::default()
        };
        assert!(config.build_cipher().is_err());
    }
}

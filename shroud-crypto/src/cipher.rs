//! Authenticated symmetric encryption with a fresh random IV per call.

use crate::error::{CryptoError, CryptoResult};
use crate::keygen::KEY_SIZE;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use shroud_types::{EncryptedData, SymmetricMaterial};

/// Byte length of an AES-GCM nonce (96 bits).
pub const NONCE_SIZE: usize = 12;

/// Algorithm tag recorded in envelopes produced by [`AesGcmCipher`].
pub const AES_GCM_ALGORITHM: &str = "AES/256/GCM/NoPadding";

/// Authenticated symmetric cipher.
///
/// `encrypt` must generate a fresh random IV on every call and record
/// the algorithm identifier in its output; `decrypt` must honor the
/// recorded identifier rather than assume a default.
pub trait Cipher: Send + Sync {
    fn encrypt(&self, material: &SymmetricMaterial, plaintext: &[u8]) -> CryptoResult<EncryptedData>;

    fn decrypt(&self, material: &SymmetricMaterial, data: &EncryptedData) -> CryptoResult<Vec<u8>>;
}

/// Default cipher adapter: AES-256-GCM with a random 96-bit nonce.
#[derive(Clone, Copy, Debug, Default)]
pub struct AesGcmCipher;

impl Cipher for AesGcmCipher {
    fn encrypt(&self, material: &SymmetricMaterial, plaintext: &[u8]) -> CryptoResult<EncryptedData> {
        let cipher = build_cipher(material)?;

        use aes_gcm::aead::rand_core::RngCore;
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CryptoError::AeadFailure {
                operation: "encryption",
            })?;

        Ok(EncryptedData {
            ciphertext,
            algorithm: AES_GCM_ALGORITHM.to_string(),
            iv: nonce_bytes.to_vec(),
        })
    }

    fn decrypt(&self, material: &SymmetricMaterial, data: &EncryptedData) -> CryptoResult<Vec<u8>> {
        if data.algorithm != AES_GCM_ALGORITHM {
            return Err(CryptoError::UnsupportedAlgorithm {
                algorithm: data.algorithm.clone(),
            });
        }
        if data.iv.len() != NONCE_SIZE {
            return Err(CryptoError::InvalidIvLength {
                expected: NONCE_SIZE,
                actual: data.iv.len(),
            });
        }

        let cipher = build_cipher(material)?;
        let nonce = Nonce::from_slice(&data.iv);
        cipher
            .decrypt(nonce, data.ciphertext.as_ref())
            .map_err(|_| CryptoError::AeadFailure {
                operation: "decryption",
            })
    }
}

fn build_cipher(material: &SymmetricMaterial) -> CryptoResult<Aes256Gcm> {
    let key = material.key_bytes();
    if key.len() != KEY_SIZE {
        return Err(CryptoError::InvalidKeyLength {
            expected: KEY_SIZE,
            actual: key.len(),
        });
    }
    Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength {
        expected: KEY_SIZE,
        actual: key.len(),
    })
}

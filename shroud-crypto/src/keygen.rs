//! Per-subject symmetric key generation.

use aes_gcm::aead::OsRng;
use shroud_types::SymmetricMaterial;

/// Byte length of a generated symmetric key (256 bits).
pub const KEY_SIZE: usize = 32;

/// Generates symmetric material for a subject's first key request.
pub trait KeyGenerator: Send + Sync {
    fn generate(&self) -> SymmetricMaterial;

    /// Name of the algorithm the generated keys are intended for.
    fn algorithm(&self) -> &str;
}

/// Default generator: 256-bit AES keys from the OS CSPRNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct Aes256KeyGen;

impl KeyGenerator for Aes256KeyGen {
    fn generate(&self) -> SymmetricMaterial {
        use aes_gcm::aead::rand_core::RngCore;
        let mut key = vec![0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        SymmetricMaterial::new(self.algorithm(), key)
    }

    fn algorithm(&self) -> &str {
        "AES"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_256_bit_keys() {
        let material = Aes256KeyGen.generate();
        assert_eq!(material.key_bytes().len(), KEY_SIZE);
        assert_eq!(material.algorithm(), "AES");
    }

    #[test]
    fn consecutive_keys_differ() {
        let a = Aes256KeyGen.generate();
        let b = Aes256KeyGen.generate();
        assert_ne!(a.key_bytes(), b.key_bytes());
    }
}

//! Cipher adapter and key generation for Shroud.
//!
//! The pipeline never touches a cipher crate directly: it sees the
//! [`Cipher`] trait, which pairs authenticated encryption with a fresh
//! random IV per call, and the [`KeyGenerator`] trait, which produces
//! per-subject symmetric material. The defaults are AES-256-GCM and
//! 256-bit AES keys; the algorithm tag travels inside every
//! [`shroud_types::EncryptedData`] so decryption never assumes one.

mod cipher;
mod error;
mod keygen;

pub use cipher::{AesGcmCipher, Cipher, AES_GCM_ALGORITHM, NONCE_SIZE};
pub use error::{CryptoError, CryptoResult};
pub use keygen::{Aes256KeyGen, KeyGenerator, KEY_SIZE};

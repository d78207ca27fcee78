//! Encrypted output of the cipher adapter and the envelope that
//! replaces personal-data fields in serialized records.

use crate::SubjectId;
use serde::{Deserialize, Serialize};

/// Output of one authenticated encryption call.
///
/// The algorithm tag records exactly what was used so decryption never
/// assumes a default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedData {
    pub ciphertext: Vec<u8>,
    pub algorithm: String,
    pub iv: Vec<u8>,
}

/// Envelope stored in place of a personal-data field.
///
/// A first-class field of the carrier schema: a non-GDPR-aware reader
/// of the same schema decodes it as a regular structured value.
/// `original_field_tag` preserves which group member was originally
/// populated so deserialization can restore it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    pub subject_id: String,
    pub original_field_tag: u32,
    pub algorithm: String,
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

impl EncryptedEnvelope {
    pub fn new(subject: &SubjectId, original_field_tag: u32, data: EncryptedData) -> Self {
        Self {
            subject_id: subject.to_string(),
            original_field_tag,
            algorithm: data.algorithm,
            iv: data.iv,
            ciphertext: data.ciphertext,
        }
    }

    /// The cipher-layer view of this envelope.
    pub fn encrypted_data(&self) -> EncryptedData {
        EncryptedData {
            ciphertext: self.ciphertext.clone(),
            algorithm: self.algorithm.clone(),
            iv: self.iv.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_preserves_cipher_output() {
        let subject = SubjectId::new("U1").unwrap();
        let data = EncryptedData {
            ciphertext: vec![9, 9, 9],
            algorithm: "AES/256/GCM/NoPadding".into(),
            iv: vec![1; 12],
        };
        let envelope = EncryptedEnvelope::new(&subject, 2, data.clone());
        assert_eq!(envelope.subject_id, "U1");
        assert_eq!(envelope.original_field_tag, 2);
        assert_eq!(envelope.encrypted_data(), data);
    }
}

//! Read path: decode via the codec, then restore redacted fields.

use crate::codec::{Codec, Headers};
use crate::error::{SerdeError, SerdeResult};
use crate::registry::{read_schema_id, SchemaRegistry};
use shroud_crypto::Cipher;
use shroud_kms::DecryptingMaterialsProvider;
use shroud_schema::{Record, Schema};
use shroud_types::{EncryptedEnvelope, SubjectId};
use std::sync::Arc;
use tracing::debug;

/// GDPR-aware deserializer.
///
/// Decodes bytes into a record of the target schema, then rehydrates
/// every populated envelope slot: the subject's material is looked up
/// (never created), the ciphertext decrypted, and the field named by
/// the envelope's original tag restored. A forgotten subject surfaces
/// as [`shroud_kms::KmsError::DecryptingMaterialNotFound`].
pub struct GdprAwareDeserializer {
    provider: Arc<dyn DecryptingMaterialsProvider>,
    cipher: Arc<dyn Cipher>,
    codec: Arc<dyn Codec>,
    registry: Arc<dyn SchemaRegistry>,
    schema: Arc<Schema>,
}

impl GdprAwareDeserializer {
    pub fn new(
        provider: Arc<dyn DecryptingMaterialsProvider>,
        cipher: Arc<dyn Cipher>,
        codec: Arc<dyn Codec>,
        registry: Arc<dyn SchemaRegistry>,
        schema: Arc<Schema>,
    ) -> Self {
        Self {
            provider,
            cipher,
            codec,
            registry,
            schema,
        }
    }

    /// Deserializes bytes into a rehydrated record. Absent bytes yield
    /// an absent record.
    pub async fn deserialize(
        &self,
        bytes: Option<&[u8]>,
        headers: &Headers,
    ) -> SerdeResult<Option<Record>> {
        let Some(bytes) = bytes else {
            return Ok(None);
        };

        // Prefer the registry's schema when the framing carries an id;
        // fall back to the deserializer's target schema.
        let schema = match read_schema_id(headers) {
            Some(id) => self.registry.get_schema(id).await?,
            None => Arc::clone(&self.schema),
        };

        let mut record = self.codec.decode(bytes, &schema, headers)?;

        let slots: Vec<String> = schema
            .envelope_slot_fields()
            .iter()
            .map(|f| f.name().to_string())
            .collect();

        for slot in slots {
            let Some(value) = record.get(&slot).cloned() else {
                continue;
            };
            let envelope: EncryptedEnvelope =
                serde_json::from_value(value).map_err(|e| SerdeError::InvalidEnvelope {
                    detail: e.to_string(),
                })?;

            let subject = SubjectId::new(envelope.subject_id.clone()).map_err(|_| {
                SerdeError::InvalidEnvelope {
                    detail: "envelope carries an empty subject id".to_string(),
                }
            })?;

            let material = self.provider.decryption_key_for(&subject).await?;
            let plaintext = self.cipher.decrypt(&material, &envelope.encrypted_data())?;
            let value: serde_json::Value = serde_json::from_slice(&plaintext)?;

            let field = schema
                .field_by_tag(envelope.original_field_tag)
                .ok_or_else(|| SerdeError::UnknownFieldTag {
                    schema: schema.name().to_string(),
                    tag: envelope.original_field_tag,
                })?;

            record.clear(&slot);
            record.set(field.name(), value)?;
            debug!(
                schema = schema.name(),
                subject = %subject,
                "restored personal data field from envelope"
            );
        }

        Ok(Some(record))
    }
}

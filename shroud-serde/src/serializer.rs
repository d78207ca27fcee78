//! Write path: redact personal fields, then hand off to the codec.

use crate::codec::{Codec, Headers};
use crate::config::PipelineConfig;
use crate::error::SerdeResult;
use crate::registry::{write_schema_id, SchemaRegistry};
use shroud_crypto::Cipher;
use shroud_kms::EncryptingMaterialsProvider;
use shroud_schema::{personal_sites_of, subject_id_of, Record};
use shroud_types::EncryptedEnvelope;
use std::sync::Arc;
use tracing::debug;

/// GDPR-aware serializer.
///
/// For records whose schema declares personal data, replaces each
/// populated personal-data field with an encrypted envelope bound to
/// the record's subject, then encodes via the external codec. Records
/// without personal data are passed through unchanged.
///
/// Safe for concurrent use; the caller's record is never mutated, so a
/// cancelled or failed call leaves no half-redacted value behind.
pub struct GdprAwareSerializer {
    provider: Arc<dyn EncryptingMaterialsProvider>,
    cipher: Arc<dyn Cipher>,
    codec: Arc<dyn Codec>,
    registry: Arc<dyn SchemaRegistry>,
    config: PipelineConfig,
}

impl GdprAwareSerializer {
    pub fn new(
        provider: Arc<dyn EncryptingMaterialsProvider>,
        cipher: Arc<dyn Cipher>,
        codec: Arc<dyn Codec>,
        registry: Arc<dyn SchemaRegistry>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            provider,
            cipher,
            codec,
            registry,
            config,
        }
    }

    /// Serializes a record, redacting personal data. Absent records
    /// yield absent bytes.
    pub async fn serialize(
        &self,
        record: Option<&Record>,
        headers: &mut Headers,
    ) -> SerdeResult<Option<Vec<u8>>> {
        let Some(record) = record else {
            return Ok(None);
        };

        let schema = Arc::clone(record.schema());
        if self.config.auto_register_schemas {
            let id = self
                .registry
                .register(schema.name(), Arc::clone(&schema))
                .await?;
            write_schema_id(headers, id);
        }

        let declares_personal_data = schema
            .personal_data_groups()
            .iter()
            .any(|g| !g.members.is_empty());
        if !declares_personal_data {
            return Ok(Some(self.codec.encode(record, headers)?));
        }

        // Subject id is resolved before any site is produced; locator
        // failures abort the call before cipher or KMS work.
        let subject = subject_id_of(record)?;
        let sites = personal_sites_of(record)?;
        if sites.is_empty() {
            return Ok(Some(self.codec.encode(record, headers)?));
        }

        let material = self.provider.encryption_key_for(&subject).await?;

        let mut redacted = record.clone();
        for site in &sites {
            let data = self.cipher.encrypt(&material, &site.plaintext)?;
            let envelope = EncryptedEnvelope::new(&subject, site.member_tag, data);
            redacted.clear(&site.member_field);
            redacted.set(&site.envelope_field, serde_json::to_value(&envelope)?)?;
            debug!(
                schema = schema.name(),
                subject = %subject,
                group = site.group.as_str(),
                "redacted personal data field into envelope"
            );
        }

        Ok(Some(self.codec.encode(&redacted, headers)?))
    }
}

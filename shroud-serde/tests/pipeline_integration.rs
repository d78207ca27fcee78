//! End-to-end pipeline tests: redact-then-encode, decode-then-rehydrate.

use pretty_assertions::assert_eq;
use serde_json::json;
use shroud_crypto::{Aes256KeyGen, AesGcmCipher, Cipher, CryptoError, CryptoResult};
use shroud_kms::{
    InMemoryCommandLog, InMemoryKms, KeyStoreConfig, KmsError, ReplicatedKeyStore,
};
use shroud_schema::{Record, Schema, SchemaError};
use shroud_serde::{
    Codec, GdprAwareDeserializer, GdprAwareSerializer, Headers, InMemorySchemaRegistry, JsonCodec,
    PipelineConfig, SerdeError, SCHEMA_ID_HEADER,
};
use shroud_types::{EncryptedData, EncryptedEnvelope, SymmetricMaterial};
use std::sync::Arc;

fn fruit_schema() -> Arc<Schema> {
    Schema::builder("Fruit").plain("name", 1).build()
}

fn farmer_schema() -> Arc<Schema> {
    Schema::builder("FarmerRegistered")
        .subject_identifier("uuid", 1)
        .personal_data("name", 2, "personal_data")
        .envelope_slot("encrypted_personal_data", 3, "personal_data")
        .plain("registered_at", 4)
        .build()
}

struct Pipeline {
    serializer: GdprAwareSerializer,
    deserializer: GdprAwareDeserializer,
}

/// Builds a serializer and deserializer sharing one in-memory KMS.
fn pipeline_for(schema: Arc<Schema>) -> Pipeline {
    let kms = Arc::new(InMemoryKms::new());
    pipeline_with(schema, kms.clone(), kms, Arc::new(AesGcmCipher))
}

fn pipeline_with(
    schema: Arc<Schema>,
    encrypting: Arc<dyn shroud_kms::EncryptingMaterialsProvider>,
    decrypting: Arc<dyn shroud_kms::DecryptingMaterialsProvider>,
    cipher: Arc<dyn Cipher>,
) -> Pipeline {
    let codec = Arc::new(JsonCodec);
    let registry = Arc::new(InMemorySchemaRegistry::new());
    Pipeline {
        serializer: GdprAwareSerializer::new(
            encrypting,
            Arc::clone(&cipher),
            codec.clone(),
            registry.clone(),
            PipelineConfig::default(),
        ),
        deserializer: GdprAwareDeserializer::new(
            decrypting,
            cipher,
            codec,
            registry,
            schema,
        ),
    }
}

#[tokio::test]
async fn absent_record_and_absent_bytes_pass_through() {
    let pipeline = pipeline_for(fruit_schema());
    let mut headers = Headers::new();

    assert!(pipeline
        .serializer
        .serialize(None, &mut headers)
        .await
        .unwrap()
        .is_none());
    assert!(pipeline
        .deserializer
        .deserialize(None, &headers)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn record_without_personal_data_is_plain_codec_compatible() {
    // A watermelon must survive a non-GDPR-aware decoder untouched.
    let schema = fruit_schema();
    let record = Record::new(Arc::clone(&schema))
        .with("name", json!("watermelon"))
        .unwrap();

    let pipeline = pipeline_for(Arc::clone(&schema));
    let mut headers = Headers::new();
    let bytes = pipeline
        .serializer
        .serialize(Some(&record), &mut headers)
        .await
        .unwrap()
        .unwrap();

    let plain = JsonCodec.decode(&bytes, &schema, &headers).unwrap();
    assert_eq!(plain, record);
}

#[tokio::test]
async fn personal_field_is_redacted_into_the_envelope() {
    // A canned cipher keeps the redacted output deterministic.
    struct MockCipher;
    impl Cipher for MockCipher {
        fn encrypt(
            &self,
            _material: &SymmetricMaterial,
            _plaintext: &[u8],
        ) -> CryptoResult<EncryptedData> {
            Ok(EncryptedData {
                ciphertext: b"mockEncryption".to_vec(),
                algorithm: "AES/CBC/PKCS5Padding".to_string(),
                iv: Vec::new(),
            })
        }

        fn decrypt(
            &self,
            _material: &SymmetricMaterial,
            _data: &EncryptedData,
        ) -> CryptoResult<Vec<u8>> {
            Err(CryptoError::AeadFailure {
                operation: "decryption",
            })
        }
    }

    let schema = farmer_schema();
    let record = Record::new(Arc::clone(&schema))
        .with("uuid", json!("U1"))
        .unwrap()
        .with("name", json!("John Doe"))
        .unwrap()
        .with("registered_at", json!(1_714_000_000))
        .unwrap();

    let kms = Arc::new(InMemoryKms::new());
    let pipeline = pipeline_with(
        Arc::clone(&schema),
        Arc::clone(&kms) as _,
        kms as _,
        Arc::new(MockCipher),
    );

    let mut headers = Headers::new();
    let bytes = pipeline
        .serializer
        .serialize(Some(&record), &mut headers)
        .await
        .unwrap()
        .unwrap();

    // Viewed by a non-GDPR-aware decoder of the same schema.
    let plain = JsonCodec.decode(&bytes, &schema, &headers).unwrap();

    assert_eq!(plain.get("uuid"), Some(&json!("U1")));
    assert!(!plain.is_set("name"), "personal field must be cleared");
    assert_eq!(plain.get("registered_at"), Some(&json!(1_714_000_000)));

    let envelope: EncryptedEnvelope =
        serde_json::from_value(plain.get("encrypted_personal_data").unwrap().clone()).unwrap();
    assert_eq!(envelope.subject_id, "U1");
    assert_eq!(envelope.ciphertext, b"mockEncryption");
    assert_eq!(envelope.original_field_tag, 2);
    assert_eq!(envelope.algorithm, "AES/CBC/PKCS5Padding");
    assert!(envelope.iv.is_empty());
}

#[tokio::test]
async fn roundtrip_restores_the_original_record() {
    let schema = farmer_schema();
    let record = Record::new(Arc::clone(&schema))
        .with("uuid", json!("U1"))
        .unwrap()
        .with("name", json!("John Doe"))
        .unwrap()
        .with("registered_at", json!(1_714_000_000))
        .unwrap();

    let pipeline = pipeline_for(Arc::clone(&schema));
    let mut headers = Headers::new();
    let bytes = pipeline
        .serializer
        .serialize(Some(&record), &mut headers)
        .await
        .unwrap()
        .unwrap();

    let restored = pipeline
        .deserializer
        .deserialize(Some(&bytes), &headers)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(restored, record);
}

#[tokio::test]
async fn roundtrip_without_populated_personal_field_needs_no_key() {
    let schema = farmer_schema();
    let record = Record::new(Arc::clone(&schema))
        .with("uuid", json!("U1"))
        .unwrap()
        .with("registered_at", json!(1_714_000_000))
        .unwrap();

    let pipeline = pipeline_for(Arc::clone(&schema));
    let mut headers = Headers::new();
    let bytes = pipeline
        .serializer
        .serialize(Some(&record), &mut headers)
        .await
        .unwrap()
        .unwrap();
    let restored = pipeline
        .deserializer
        .deserialize(Some(&bytes), &headers)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(restored, record);
}

#[tokio::test]
async fn missing_key_on_a_fresh_node_fails_deserialization() {
    // Producer and consumer do not share key material.
    let schema = farmer_schema();
    let record = Record::new(Arc::clone(&schema))
        .with("uuid", json!("U2"))
        .unwrap()
        .with("name", json!("Jane Doe"))
        .unwrap();

    let producer_kms = Arc::new(InMemoryKms::new());
    let consumer_kms = Arc::new(InMemoryKms::new());
    let pipeline = pipeline_with(
        Arc::clone(&schema),
        producer_kms as _,
        consumer_kms as _,
        Arc::new(AesGcmCipher),
    );

    let mut headers = Headers::new();
    let bytes = pipeline
        .serializer
        .serialize(Some(&record), &mut headers)
        .await
        .unwrap()
        .unwrap();

    let err = pipeline
        .deserializer
        .deserialize(Some(&bytes), &headers)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SerdeError::Kms(KmsError::DecryptingMaterialNotFound { subject }) if subject == "U2"
    ));
}

#[tokio::test]
async fn forgotten_subject_is_unrecoverable() {
    let schema = farmer_schema();
    let record = Record::new(Arc::clone(&schema))
        .with("uuid", json!("U3"))
        .unwrap()
        .with("name", json!("John Doe"))
        .unwrap();

    let kms = Arc::new(InMemoryKms::new());
    let pipeline = pipeline_with(
        Arc::clone(&schema),
        Arc::clone(&kms) as _,
        Arc::clone(&kms) as _,
        Arc::new(AesGcmCipher),
    );

    let mut headers = Headers::new();
    let bytes = pipeline
        .serializer
        .serialize(Some(&record), &mut headers)
        .await
        .unwrap()
        .unwrap();

    kms.forget(&shroud_types::SubjectId::new("U3").unwrap())
        .await
        .unwrap();

    let err = pipeline
        .deserializer
        .deserialize(Some(&bytes), &headers)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SerdeError::Kms(KmsError::DecryptingMaterialNotFound { .. })
    ));
}

#[tokio::test]
async fn duplicate_subject_identifier_fails_on_first_serialize() {
    let schema = Schema::builder("TwoSubjects")
        .subject_identifier("uuid", 1)
        .subject_identifier("email", 2)
        .personal_data("name", 3, "pii")
        .envelope_slot("encrypted_pii", 4, "pii")
        .build();
    let record = Record::new(Arc::clone(&schema))
        .with("uuid", json!("U1"))
        .unwrap()
        .with("name", json!("John"))
        .unwrap();

    let pipeline = pipeline_for(schema);
    let mut headers = Headers::new();
    let err = pipeline
        .serializer
        .serialize(Some(&record), &mut headers)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SerdeError::Schema(SchemaError::SubjectIdentifierAnnotation { count: 2, .. })
    ));
}

#[tokio::test]
async fn failed_serialize_leaves_the_caller_record_untouched() {
    struct FailingProvider;

    #[async_trait::async_trait]
    impl shroud_kms::EncryptingMaterialsProvider for FailingProvider {
        async fn encryption_key_for(
            &self,
            _subject: &shroud_types::SubjectId,
        ) -> Result<SymmetricMaterial, KmsError> {
            Err(KmsError::Unavailable {
                detail: "broker down".into(),
            })
        }
    }

    let schema = farmer_schema();
    let record = Record::new(Arc::clone(&schema))
        .with("uuid", json!("U1"))
        .unwrap()
        .with("name", json!("John Doe"))
        .unwrap();
    let snapshot = record.clone();

    let pipeline = pipeline_with(
        Arc::clone(&schema),
        Arc::new(FailingProvider),
        Arc::new(InMemoryKms::new()),
        Arc::new(AesGcmCipher),
    );

    let mut headers = Headers::new();
    assert!(pipeline
        .serializer
        .serialize(Some(&record), &mut headers)
        .await
        .is_err());
    assert_eq!(record, snapshot);
}

#[tokio::test]
async fn schema_id_header_lets_the_registry_supply_the_schema() {
    let schema = farmer_schema();
    let record = Record::new(Arc::clone(&schema))
        .with("uuid", json!("U1"))
        .unwrap()
        .with("name", json!("John Doe"))
        .unwrap();

    let kms = Arc::new(InMemoryKms::new());
    let codec = Arc::new(JsonCodec);
    let registry = Arc::new(InMemorySchemaRegistry::new());
    let serializer = GdprAwareSerializer::new(
        Arc::clone(&kms) as _,
        Arc::new(AesGcmCipher),
        codec.clone(),
        registry.clone(),
        PipelineConfig::default(),
    );
    // Deserializer is configured for a different record type; the
    // header hint must override it.
    let deserializer = GdprAwareDeserializer::new(
        kms as _,
        Arc::new(AesGcmCipher),
        codec,
        registry,
        fruit_schema(),
    );

    let mut headers = Headers::new();
    let bytes = serializer
        .serialize(Some(&record), &mut headers)
        .await
        .unwrap()
        .unwrap();
    assert!(headers.contains_key(SCHEMA_ID_HEADER));

    let restored = deserializer
        .deserialize(Some(&bytes), &headers)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(restored, record);
}

#[tokio::test]
async fn multiple_groups_roundtrip_in_schema_order() {
    let schema = Schema::builder("Profile")
        .subject_identifier("uuid", 1)
        .personal_data("name", 2, "identity")
        .envelope_slot("encrypted_identity", 3, "identity")
        .personal_data("email", 4, "contact")
        .envelope_slot("encrypted_contact", 5, "contact")
        .build();
    let record = Record::new(Arc::clone(&schema))
        .with("uuid", json!("U1"))
        .unwrap()
        .with("name", json!("John Doe"))
        .unwrap()
        .with("email", json!("jd@example.com"))
        .unwrap();

    let pipeline = pipeline_for(Arc::clone(&schema));
    let mut headers = Headers::new();
    let bytes = pipeline
        .serializer
        .serialize(Some(&record), &mut headers)
        .await
        .unwrap()
        .unwrap();

    let plain = JsonCodec.decode(&bytes, &schema, &headers).unwrap();
    assert!(plain.is_set("encrypted_identity"));
    assert!(plain.is_set("encrypted_contact"));
    assert!(!plain.is_set("name"));
    assert!(!plain.is_set("email"));

    let restored = pipeline
        .deserializer
        .deserialize(Some(&bytes), &headers)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(restored, record);
}

#[tokio::test]
async fn pipeline_over_the_replicated_key_store() {
    // Full stack: producer and consumer nodes sharing one command log.
    let log = InMemoryCommandLog::new("shroud.kms.commands");
    let config = KeyStoreConfig {
        startup_timeout_ms: 5_000,
        poll_interval_ms: 1,
        ..KeyStoreConfig::default()
    };

    let producer_store = Arc::new(
        ReplicatedKeyStore::open(config.clone(), Arc::new(Aes256KeyGen), Arc::new(log.clone()))
            .await
            .unwrap(),
    );
    let consumer_store = Arc::new(
        ReplicatedKeyStore::open(config, Arc::new(Aes256KeyGen), Arc::new(log))
            .await
            .unwrap(),
    );

    let schema = farmer_schema();
    let record = Record::new(Arc::clone(&schema))
        .with("uuid", json!("U7"))
        .unwrap()
        .with("name", json!("John Doe"))
        .unwrap();

    let codec = Arc::new(JsonCodec);
    let registry = Arc::new(InMemorySchemaRegistry::new());
    let serializer = GdprAwareSerializer::new(
        Arc::clone(&producer_store) as _,
        Arc::new(AesGcmCipher),
        codec.clone(),
        registry.clone(),
        PipelineConfig::default(),
    );
    let deserializer = GdprAwareDeserializer::new(
        Arc::clone(&consumer_store) as _,
        Arc::new(AesGcmCipher),
        codec,
        registry,
        Arc::clone(&schema),
    );

    let mut headers = Headers::new();
    let bytes = serializer
        .serialize(Some(&record), &mut headers)
        .await
        .unwrap()
        .unwrap();

    // Let the consumer's view catch up with the Register command.
    consumer_store.synchronize().await.unwrap();

    let restored = deserializer
        .deserialize(Some(&bytes), &headers)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(restored, record);

    producer_store.close().await;
    consumer_store.close().await;
}

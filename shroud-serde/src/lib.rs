//! GDPR-aware serialization pipeline.
//!
//! Composes the personal-data locator, a key-material provider, and the
//! cipher adapter around an opaque [`Codec`]: on the write path personal
//! fields are redacted into an encrypted envelope before encoding, on
//! the read path envelopes are decrypted and the original fields
//! restored. Records without personal data pass through the codec
//! untouched, so the output stays readable by any schema-aware consumer
//! that ignores the annotations.

mod codec;
mod config;
mod deserializer;
mod error;
mod registry;
mod serializer;

pub use codec::{Codec, Headers, JsonCodec};
pub use config::PipelineConfig;
pub use deserializer::GdprAwareDeserializer;
pub use error::{SerdeError, SerdeResult};
pub use registry::{InMemorySchemaRegistry, SchemaRegistry, SCHEMA_ID_HEADER};
pub use serializer::GdprAwareSerializer;

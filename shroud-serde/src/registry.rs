//! Schema registry plug-in point.

use crate::codec::Headers;
use crate::error::{SerdeError, SerdeResult};
use async_trait::async_trait;
use shroud_schema::Schema;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Header carrying the registered schema id of the encoded record.
pub const SCHEMA_ID_HEADER: &str = "shroud.schema.id";

/// Maps subjects to schemas and schema ids back to schemas.
#[async_trait]
pub trait SchemaRegistry: Send + Sync {
    /// Registers a schema under a subject, returning its id. Repeated
    /// registration of the same subject returns the same id.
    async fn register(&self, subject: &str, schema: Arc<Schema>) -> SerdeResult<u32>;

    async fn get_schema(&self, id: u32) -> SerdeResult<Arc<Schema>>;
}

/// Process-local registry, mock-capable for tests.
#[derive(Default)]
pub struct InMemorySchemaRegistry {
    inner: RwLock<RegistryState>,
}

#[derive(Default)]
struct RegistryState {
    by_subject: HashMap<String, u32>,
    by_id: HashMap<u32, Arc<Schema>>,
    next_id: u32,
}

impl InMemorySchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SchemaRegistry for InMemorySchemaRegistry {
    async fn register(&self, subject: &str, schema: Arc<Schema>) -> SerdeResult<u32> {
        let mut state = self.inner.write().await;
        if let Some(id) = state.by_subject.get(subject) {
            return Ok(*id);
        }
        state.next_id += 1;
        let id = state.next_id;
        state.by_subject.insert(subject.to_string(), id);
        state.by_id.insert(id, schema);
        Ok(id)
    }

    async fn get_schema(&self, id: u32) -> SerdeResult<Arc<Schema>> {
        self.inner
            .read()
            .await
            .by_id
            .get(&id)
            .cloned()
            .ok_or(SerdeError::SchemaNotFound { id })
    }
}

/// Writes the schema-id hint into the framing headers.
pub(crate) fn write_schema_id(headers: &mut Headers, id: u32) {
    headers.insert(SCHEMA_ID_HEADER.to_string(), id.to_be_bytes().to_vec());
}

/// Reads the schema-id hint back, if present and well-formed.
pub(crate) fn read_schema_id(headers: &Headers) -> Option<u32> {
    let bytes = headers.get(SCHEMA_ID_HEADER)?;
    let bytes: [u8; 4] = bytes.as_slice().try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}

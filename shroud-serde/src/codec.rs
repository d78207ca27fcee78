//! Codec plug-in point: the opaque wire framing of records.

use crate::error::SerdeResult;
use shroud_schema::{Record, Schema};
use std::collections::HashMap;
use std::sync::Arc;

/// Side-channel headers map, owned by the framing layer. The pipeline
/// is transparent to it apart from the schema-id hint.
pub type Headers = HashMap<String, Vec<u8>>;

/// Encodes and decodes records to byte strings.
///
/// The pipeline treats the framing as opaque: a codec that ignores the
/// GDPR annotations must be able to decode the pipeline's output into a
/// structurally valid record (with the envelope slot populated).
pub trait Codec: Send + Sync {
    fn encode(&self, record: &Record, headers: &mut Headers) -> SerdeResult<Vec<u8>>;

    fn decode(&self, bytes: &[u8], schema: &Arc<Schema>, headers: &Headers) -> SerdeResult<Record>;
}

/// JSON object framing: populated fields become object members.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, record: &Record, _headers: &mut Headers) -> SerdeResult<Vec<u8>> {
        let mut object = serde_json::Map::new();
        for (name, value) in record.values() {
            object.insert(name.to_string(), value.clone());
        }
        Ok(serde_json::to_vec(&serde_json::Value::Object(object))?)
    }

    fn decode(&self, bytes: &[u8], schema: &Arc<Schema>, _headers: &Headers) -> SerdeResult<Record> {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(bytes)?;
        Ok(Record::from_values(Arc::clone(schema), object)?)
    }
}

//! Personal-data locator: a rule engine over schema annotations.
//!
//! Translates `subject_identifier` / `personal_data` annotations into
//! an ordered list of redaction operations over a concrete record.
//! Purely local and non-blocking; all failures here abort a serialize
//! call before any cipher work happens.

use crate::descriptor::Schema;
use crate::error::{SchemaError, SchemaResult};
use crate::record::Record;
use serde_json::Value;
use shroud_types::SubjectId;

/// One redaction operation: a populated personal-data member and the
/// envelope slot its ciphertext goes to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Site {
    /// Name of the personal-data group this site belongs to.
    pub group: String,
    /// Name of the populated member field.
    pub member_field: String,
    /// Stable numeric tag of the populated member field.
    pub member_tag: u32,
    /// Serialized bytes of the member's value.
    pub plaintext: Vec<u8>,
    /// Name of the group's envelope slot field.
    pub envelope_field: String,
}

/// Resolves the record's subject identifier.
///
/// The schema must declare exactly one `subject_identifier` field, and
/// the record must hold a non-blank value for it.
pub fn subject_id_of(record: &Record) -> SchemaResult<SubjectId> {
    let schema = record.schema();
    let candidates = schema.subject_identifier_fields();

    let field = match candidates.as_slice() {
        [single] => *single,
        _ => {
            return Err(SchemaError::SubjectIdentifierAnnotation {
                schema: schema.name().to_string(),
                count: candidates.len(),
            })
        }
    };

    let missing = || SchemaError::SubjectIdentifierMissing {
        schema: schema.name().to_string(),
        field: field.name().to_string(),
    };

    let text = match record.get(field.name()) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => return Err(missing()),
    };

    SubjectId::new(text).map_err(|_| missing())
}

/// Finds all redaction sites of a record, in schema-declared group order.
///
/// For each personal-data group: if exactly one member is populated, one
/// site is emitted; if no member is populated, or the envelope slot is
/// already occupied, the group is skipped. A group declaring personal
/// data without exactly one envelope slot is a configuration error
/// regardless of record content.
pub fn personal_sites_of(record: &Record) -> SchemaResult<Vec<Site>> {
    let schema = record.schema();
    let mut sites = Vec::new();

    for group in schema.personal_data_groups() {
        if group.members.is_empty() {
            // Slot-only group; nothing can ever be redacted into it.
            continue;
        }

        let envelope_field = match group.envelope_slots.as_slice() {
            [single] => single.clone(),
            slots => {
                return Err(SchemaError::EnvelopeSlotAnnotation {
                    schema: schema.name().to_string(),
                    group: group.name.clone(),
                    count: slots.len(),
                })
            }
        };

        let populated: Vec<&String> = group
            .members
            .iter()
            .filter(|m| record.is_set(m))
            .collect();

        let member_field = match populated.as_slice() {
            [] => continue,
            [single] => (*single).clone(),
            [first, second, ..] => {
                return Err(SchemaError::AmbiguousGroupState {
                    schema: schema.name().to_string(),
                    group: group.name.clone(),
                    first: (*first).clone(),
                    second: (*second).clone(),
                })
            }
        };

        if record.is_set(&envelope_field) {
            continue;
        }

        let value = record
            .get(&member_field)
            .ok_or_else(|| SchemaError::UnknownField {
                schema: schema.name().to_string(),
                field: member_field.clone(),
            })?;
        let plaintext =
            serde_json::to_vec(value).map_err(|e| SchemaError::FieldSerialization {
                schema: schema.name().to_string(),
                field: member_field.clone(),
                detail: e.to_string(),
            })?;

        let member_tag = schema
            .field(&member_field)
            .map(|f| f.tag())
            .ok_or_else(|| SchemaError::UnknownField {
                schema: schema.name().to_string(),
                field: member_field.clone(),
            })?;

        sites.push(Site {
            group: group.name,
            member_field,
            member_tag,
            plaintext,
            envelope_field,
        });
    }

    Ok(sites)
}

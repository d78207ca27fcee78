//! Schema and locator error types.

use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors from the schema model and the personal-data locator.
///
/// Annotation variants are programmer errors in schema design and are
/// surfaced on first use; `SubjectIdentifierMissing` is a data error
/// fatal for the offending record only.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("schema {schema}: expected exactly one subject identifier field, found {count}")]
    SubjectIdentifierAnnotation { schema: String, count: usize },

    #[error("schema {schema}: subject identifier field {field} is unset or blank")]
    SubjectIdentifierMissing { schema: String, field: String },

    #[error(
        "schema {schema}: personal data group {group} declares {count} envelope slots, \
         exactly one is required"
    )]
    EnvelopeSlotAnnotation {
        schema: String,
        group: String,
        count: usize,
    },

    #[error("schema {schema}: group {group} members {first} and {second} are both populated")]
    AmbiguousGroupState {
        schema: String,
        group: String,
        first: String,
        second: String,
    },

    #[error("schema {schema} has no field named {field}")]
    UnknownField { schema: String, field: String },

    #[error("schema {schema}: field {field} could not be serialized: {detail}")]
    FieldSerialization {
        schema: String,
        field: String,
        detail: String,
    },
}

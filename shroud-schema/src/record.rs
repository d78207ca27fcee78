//! Concrete records described by a schema.

use crate::descriptor::Schema;
use crate::error::{SchemaError, SchemaResult};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A schema-described value: named fields holding JSON values.
///
/// Immutable from the pipeline caller's viewpoint; the redact step
/// always operates on a clone so a failed serialize never leaves a
/// half-mutated record behind.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    schema: Arc<Schema>,
    values: BTreeMap<String, Value>,
}

impl Record {
    /// Creates an empty record for a schema.
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            values: BTreeMap::new(),
        }
    }

    /// Rebuilds a record from decoded field values, rejecting fields
    /// the schema does not declare.
    pub fn from_values(
        schema: Arc<Schema>,
        values: impl IntoIterator<Item = (String, Value)>,
    ) -> SchemaResult<Self> {
        let mut record = Self::new(schema);
        for (name, value) in values {
            record.set(&name, value)?;
        }
        Ok(record)
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Sets a field value. `Null` clears the field.
    pub fn set(&mut self, field: &str, value: Value) -> SchemaResult<()> {
        if self.schema.field(field).is_none() {
            return Err(SchemaError::UnknownField {
                schema: self.schema.name().to_string(),
                field: field.to_string(),
            });
        }
        if value.is_null() {
            self.values.remove(field);
        } else {
            self.values.insert(field.to_string(), value);
        }
        Ok(())
    }

    /// Builder-style `set` for constructing records in one expression.
    pub fn with(mut self, field: &str, value: Value) -> SchemaResult<Self> {
        self.set(field, value)?;
        Ok(self)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn get_by_tag(&self, tag: u32) -> Option<&Value> {
        self.schema
            .field_by_tag(tag)
            .and_then(|f| self.values.get(f.name()))
    }

    /// Whether the field holds a value.
    pub fn is_set(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Clears a field.
    pub fn clear(&mut self, field: &str) {
        self.values.remove(field);
    }

    /// Populated fields, in field-name order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fruit_schema() -> Arc<Schema> {
        Schema::builder("Fruit").plain("name", 1).build()
    }

    #[test]
    fn unknown_field_rejected() {
        let mut record = Record::new(fruit_schema());
        let err = record.set("color", json!("green")).unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownField {
                schema: "Fruit".into(),
                field: "color".into(),
            }
        );
    }

    #[test]
    fn null_clears_field() {
        let mut record = Record::new(fruit_schema());
        record.set("name", json!("watermelon")).unwrap();
        assert!(record.is_set("name"));
        record.set("name", Value::Null).unwrap();
        assert!(!record.is_set("name"));
    }

    #[test]
    fn tag_access_follows_schema() {
        let record = Record::new(fruit_schema())
            .with("name", json!("watermelon"))
            .unwrap();
        assert_eq!(record.get_by_tag(1), Some(&json!("watermelon")));
        assert_eq!(record.get_by_tag(2), None);
    }
}

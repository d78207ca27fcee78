//! Schema metadata: field descriptors, annotations, and group lookup.

use std::sync::Arc;

/// Semantic annotation on a schema field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldAnnotation {
    /// This field's value, coerced to text, identifies the data subject.
    SubjectIdentifier,
    /// This field holds personal data and belongs to the named group.
    PersonalData { group: String },
    /// This field is the encrypted-envelope slot of the named group.
    EnvelopeSlot { group: String },
}

/// One field in a schema: a name, a stable numeric tag, and zero or
/// more annotations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: String,
    tag: u32,
    annotations: Vec<FieldAnnotation>,
}

impl FieldDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stable numeric identifier of this field within its schema.
    pub fn tag(&self) -> u32 {
        self.tag
    }

    pub fn annotations(&self) -> &[FieldAnnotation] {
        &self.annotations
    }

    pub fn is_subject_identifier(&self) -> bool {
        self.annotations
            .iter()
            .any(|a| matches!(a, FieldAnnotation::SubjectIdentifier))
    }

    pub fn personal_data_group(&self) -> Option<&str> {
        self.annotations.iter().find_map(|a| match a {
            FieldAnnotation::PersonalData { group } => Some(group.as_str()),
            _ => None,
        })
    }

    pub fn envelope_slot_group(&self) -> Option<&str> {
        self.annotations.iter().find_map(|a| match a {
            FieldAnnotation::EnvelopeSlot { group } => Some(group.as_str()),
            _ => None,
        })
    }
}

/// A mutually-exclusive personal-data group resolved from a schema.
///
/// Members and the slot are field names; resolution preserves schema
/// declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersonalDataGroup {
    pub name: String,
    pub members: Vec<String>,
    pub envelope_slots: Vec<String>,
}

/// Self-descriptive metadata over a record's field tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_by_tag(&self, tag: u32) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.tag == tag)
    }

    /// Fields annotated `subject_identifier`, in declaration order.
    pub fn subject_identifier_fields(&self) -> Vec<&FieldDescriptor> {
        self.fields
            .iter()
            .filter(|f| f.is_subject_identifier())
            .collect()
    }

    /// Personal-data groups in order of first appearance in the schema.
    ///
    /// A group exists as soon as any field references it, either as a
    /// personal-data member or as an envelope slot.
    pub fn personal_data_groups(&self) -> Vec<PersonalDataGroup> {
        let mut groups: Vec<PersonalDataGroup> = Vec::new();

        for field in &self.fields {
            if let Some(group) = field.personal_data_group() {
                entry(&mut groups, group).members.push(field.name.clone());
            }
            if let Some(group) = field.envelope_slot_group() {
                entry(&mut groups, group)
                    .envelope_slots
                    .push(field.name.clone());
            }
        }

        groups
    }

    /// Fields annotated as envelope slots, in declaration order.
    pub fn envelope_slot_fields(&self) -> Vec<&FieldDescriptor> {
        self.fields
            .iter()
            .filter(|f| f.envelope_slot_group().is_some())
            .collect()
    }
}

fn entry<'g>(groups: &'g mut Vec<PersonalDataGroup>, name: &str) -> &'g mut PersonalDataGroup {
    let idx = match groups.iter().position(|g| g.name == name) {
        Some(idx) => idx,
        None => {
            groups.push(PersonalDataGroup {
                name: name.to_string(),
                members: Vec::new(),
                envelope_slots: Vec::new(),
            });
            groups.len() - 1
        }
    };
    &mut groups[idx]
}

/// Builder for schemas.
///
/// Annotation consistency (exactly one subject identifier, exactly one
/// envelope slot per group) is deliberately not enforced here: schemas
/// come from upstream definitions, and the locator surfaces annotation
/// errors on first use.
pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl SchemaBuilder {
    /// Adds an unannotated field.
    pub fn plain(self, name: impl Into<String>, tag: u32) -> Self {
        self.field(name, tag, Vec::new())
    }

    /// Adds a field annotated `subject_identifier`.
    pub fn subject_identifier(self, name: impl Into<String>, tag: u32) -> Self {
        self.field(name, tag, vec![FieldAnnotation::SubjectIdentifier])
    }

    /// Adds a field annotated `personal_data` in the given group.
    pub fn personal_data(
        self,
        name: impl Into<String>,
        tag: u32,
        group: impl Into<String>,
    ) -> Self {
        self.field(
            name,
            tag,
            vec![FieldAnnotation::PersonalData {
                group: group.into(),
            }],
        )
    }

    /// Adds the encrypted-envelope slot of the given group.
    pub fn envelope_slot(
        self,
        name: impl Into<String>,
        tag: u32,
        group: impl Into<String>,
    ) -> Self {
        self.field(
            name,
            tag,
            vec![FieldAnnotation::EnvelopeSlot {
                group: group.into(),
            }],
        )
    }

    /// Adds a field with explicit annotations.
    pub fn field(
        mut self,
        name: impl Into<String>,
        tag: u32,
        annotations: Vec<FieldAnnotation>,
    ) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.into(),
            tag,
            annotations,
        });
        self
    }

    pub fn build(self) -> Arc<Schema> {
        Arc::new(Schema {
            name: self.name,
            fields: self.fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_resolve_in_declaration_order() {
        let schema = Schema::builder("TwoGroups")
            .subject_identifier("uuid", 1)
            .personal_data("name", 2, "pii")
            .envelope_slot("encrypted_pii", 3, "pii")
            .personal_data("email", 4, "contact")
            .envelope_slot("encrypted_contact", 5, "contact")
            .build();

        let groups = schema.personal_data_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "pii");
        assert_eq!(groups[0].members, vec!["name"]);
        assert_eq!(groups[0].envelope_slots, vec!["encrypted_pii"]);
        assert_eq!(groups[1].name, "contact");
    }

    #[test]
    fn tag_lookup() {
        let schema = Schema::builder("Fruit").plain("name", 1).build();
        assert_eq!(schema.field_by_tag(1).unwrap().name(), "name");
        assert!(schema.field_by_tag(9).is_none());
    }
}

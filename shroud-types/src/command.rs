//! Key-store command wire format and the per-subject aggregate.

use crate::{SubjectId, SymmetricMaterial};
use serde::{Deserialize, Serialize};

/// A command on the replicated key-store log, keyed by subject.
///
/// Externally tagged JSON is the stable wire format: downstream
/// consumers may replay the log at any time to rebuild aggregates, so
/// variants are additive-only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum KmsCommand {
    /// Register freshly generated key material for a subject.
    /// Idempotent: only the first registration per subject takes effect.
    Register { material: SymmetricMaterial },
    /// Cryptographically erase a subject's key material.
    Forget,
}

/// Current folded state for one subject in the event-sourced key store.
///
/// Holds at most one material in the current design (no rotation). An
/// empty materials list means the subject is unknown or forgotten.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubjectKeyAggregate {
    subject: SubjectId,
    materials: Vec<SymmetricMaterial>,
}

impl SubjectKeyAggregate {
    /// Creates an empty aggregate for a subject.
    pub fn empty(subject: SubjectId) -> Self {
        Self {
            subject,
            materials: Vec::new(),
        }
    }

    pub fn with_material(subject: SubjectId, material: SymmetricMaterial) -> Self {
        Self {
            subject,
            materials: vec![material],
        }
    }

    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }

    /// The current material, if any.
    pub fn current_material(&self) -> Option<&SymmetricMaterial> {
        self.materials.first()
    }

    pub fn materials(&self) -> &[SymmetricMaterial] {
        &self.materials
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Returns a copy of this aggregate with the material appended.
    pub fn registered(&self, material: SymmetricMaterial) -> Self {
        let mut materials = self.materials.clone();
        materials.push(material);
        Self {
            subject: self.subject.clone(),
            materials,
        }
    }

    /// Returns a copy of this aggregate with all materials erased.
    pub fn forgotten(&self) -> Self {
        Self::empty(self.subject.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_wire_format_is_externally_tagged() {
        let json = serde_json::to_value(&KmsCommand::Forget).unwrap();
        assert_eq!(json, serde_json::json!("Forget"));

        let material = SymmetricMaterial::new("AES", vec![1, 2, 3]);
        let json = serde_json::to_value(&KmsCommand::Register { material }).unwrap();
        assert!(json.get("Register").is_some());
    }

    #[test]
    fn forgotten_aggregate_has_no_materials() {
        let subject = SubjectId::new("U1").unwrap();
        let agg = SubjectKeyAggregate::with_material(
            subject,
            SymmetricMaterial::new("AES", vec![0; 32]),
        );
        assert!(!agg.is_empty());
        assert!(agg.forgotten().is_empty());
    }
}

//! Subject identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A subject identifier was empty or blank.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("subject identifier must be a non-empty string")]
pub struct InvalidSubjectId;

/// Opaque identifier of a data subject (a natural person).
///
/// Non-empty by construction. Used as the key of the KMS command log,
/// so its string form must be stable.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectId(String);

impl SubjectId {
    /// Creates a subject id, rejecting empty or whitespace-only input.
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidSubjectId> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(InvalidSubjectId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SubjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SubjectId {
    type Error = InvalidSubjectId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SubjectId> for String {
    fn from(id: SubjectId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_blank() {
        assert_eq!(SubjectId::new("").unwrap_err(), InvalidSubjectId);
        assert_eq!(SubjectId::new("   ").unwrap_err(), InvalidSubjectId);
    }

    #[test]
    fn serde_roundtrip_validates() {
        let sid = SubjectId::new("U1").unwrap();
        let json = serde_json::to_string(&sid).unwrap();
        assert_eq!(json, "\"U1\"");
        assert_eq!(serde_json::from_str::<SubjectId>(&json).unwrap(), sid);
        assert!(serde_json::from_str::<SubjectId>("\"\"").is_err());
    }
}

//! Shared domain types for Shroud.
//!
//! Everything that crosses a crate boundary lives here: subject
//! identifiers, symmetric key material, the key-store command wire
//! format, and the encrypted envelope that replaces personal-data
//! fields inside serialized records.

mod command;
mod envelope;
mod material;
mod subject;

pub use command::{KmsCommand, SubjectKeyAggregate};
pub use envelope::{EncryptedData, EncryptedEnvelope};
pub use material::SymmetricMaterial;
pub use subject::{InvalidSubjectId, SubjectId};

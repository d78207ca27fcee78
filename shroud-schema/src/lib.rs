//! Self-describing schema model and personal-data locator.
//!
//! A [`Schema`] annotates fields of a record tree with the two
//! GDPR-relevant markers: `subject_identifier` (whose data this is) and
//! `personal_data` (what must be redacted). Personal-data fields belong
//! to a mutually-exclusive group whose sibling is an `encrypted_envelope`
//! slot. The locator is a small rule engine over that metadata: given a
//! concrete [`Record`] it finds the subject id and the redaction sites.

mod descriptor;
mod error;
mod locator;
mod record;

pub use descriptor::{FieldAnnotation, FieldDescriptor, PersonalDataGroup, Schema, SchemaBuilder};
pub use error::{SchemaError, SchemaResult};
pub use locator::{personal_sites_of, subject_id_of, Site};
pub use record::Record;

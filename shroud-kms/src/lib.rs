//! Event-sourced per-subject key store.
//!
//! A command log keyed by [`shroud_types::SubjectId`] carries
//! `Register` / `Forget` commands; a background projector folds them
//! into per-subject aggregates held in materialized views. The fold is
//! pure and idempotent, which is what gives at-most-one-key-per-subject
//! semantics under replay and under races between producers: the log
//! linearizes competing registrations and only the first takes effect.
//!
//! Two providers are offered:
//! - [`ReplicatedKeyStore`]: the real thing, built on a [`CommandLog`].
//! - [`InMemoryKms`]: a process-local map for development and tests;
//!   keys are not visible to other nodes.

mod config;
mod error;
mod fold;
mod log;
mod memory;
mod provider;
mod store;
mod view;

pub use config::KeyStoreConfig;
pub use error::{KmsError, KmsResult};
pub use fold::apply_command;
pub use log::{CommandLog, CommandRecord, InMemoryCommandLog};
pub use memory::InMemoryKms;
pub use provider::{DecryptingMaterialsProvider, EncryptingMaterialsProvider};
pub use store::ReplicatedKeyStore;
pub use view::KeyView;

//! Key store configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the replicated key store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyStoreConfig {
    /// Name of the command log topic (`topic.commands`).
    pub commands_topic: String,

    /// Name of the local materialized view (`store.local.name`).
    pub local_store_name: String,

    /// Name of the globally-replicated view (`store.global.name`).
    pub global_store_name: String,

    /// Startup barrier wait in milliseconds (`startup.timeout_ms`).
    pub startup_timeout_ms: u64,

    /// Projector poll cadence in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for KeyStoreConfig {
    fn default() -> Self {
        Self {
            commands_topic: "shroud.kms.commands".to_string(),
            local_store_name: "kms-local-aggregate".to_string(),
            global_store_name: "kms-global-aggregate".to_string(),
            startup_timeout_ms: 60_000,
            poll_interval_ms: 10,
        }
    }
}

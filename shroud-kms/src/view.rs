//! Materialized views over folded aggregates.

use shroud_types::{SubjectId, SubjectKeyAggregate, SymmetricMaterial};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Read-mostly projection of per-subject aggregates.
///
/// The projector task is the only writer; readers may query
/// concurrently from any thread. The name identifies the view in logs
/// (`store.local.name` / `store.global.name`).
#[derive(Clone)]
pub struct KeyView {
    name: String,
    aggregates: Arc<RwLock<HashMap<SubjectId, SubjectKeyAggregate>>>,
}

impl KeyView {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aggregates: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn get(&self, subject: &SubjectId) -> Option<SubjectKeyAggregate> {
        self.aggregates.read().await.get(subject).cloned()
    }

    /// The subject's current material, if the aggregate exists and is
    /// not forgotten.
    pub async fn current_material(&self, subject: &SubjectId) -> Option<SymmetricMaterial> {
        self.aggregates
            .read()
            .await
            .get(subject)
            .and_then(|agg| agg.current_material().cloned())
    }

    /// Replaces the subject's aggregate. Forgotten aggregates are kept
    /// as tombstones so readers can distinguish "erased" from "never
    /// seen" in logs.
    pub async fn put(&self, aggregate: SubjectKeyAggregate) {
        self.aggregates
            .write()
            .await
            .insert(aggregate.subject().clone(), aggregate);
    }

    pub async fn len(&self) -> usize {
        self.aggregates.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.aggregates.read().await.is_empty()
    }
}

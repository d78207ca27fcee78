//! Command log abstraction and its in-memory implementation.
//!
//! The log is append-only, keyed by subject, and globally ordered per
//! subject (single partition per key). Consumers poll from an offset;
//! replaying from offset zero rebuilds every aggregate.

use crate::error::KmsResult;
use async_trait::async_trait;
use shroud_types::SubjectId;
use std::sync::Arc;
use tokio::sync::RwLock;

/// One appended command: the subject key and the serialized payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandRecord {
    pub offset: u64,
    pub subject: SubjectId,
    pub payload: Vec<u8>,
}

/// Append-only, replicated command topic.
///
/// Implementations must preserve append order per subject and retain
/// records so any consumer can replay from offset zero.
#[async_trait]
pub trait CommandLog: Send + Sync + 'static {
    /// Appends a serialized command, returning its offset.
    async fn append(&self, subject: &SubjectId, payload: Vec<u8>) -> KmsResult<u64>;

    /// Fetches up to `max` records starting at `from_offset`. Returns
    /// immediately, possibly empty.
    async fn fetch(&self, from_offset: u64, max: usize) -> KmsResult<Vec<CommandRecord>>;

    /// Offset one past the last appended record.
    async fn end_offset(&self) -> KmsResult<u64>;
}

/// Process-local command log for development and tests.
///
/// A single shared instance stands in for the replicated topic: every
/// store node handed a clone observes the same totally-ordered records.
#[derive(Clone)]
pub struct InMemoryCommandLog {
    topic: String,
    records: Arc<RwLock<Vec<CommandRecord>>>,
}

impl InMemoryCommandLog {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

#[async_trait]
impl CommandLog for InMemoryCommandLog {
    async fn append(&self, subject: &SubjectId, payload: Vec<u8>) -> KmsResult<u64> {
        let mut records = self.records.write().await;
        let offset = records.len() as u64;
        records.push(CommandRecord {
            offset,
            subject: subject.clone(),
            payload,
        });
        Ok(offset)
    }

    async fn fetch(&self, from_offset: u64, max: usize) -> KmsResult<Vec<CommandRecord>> {
        let records = self.records.read().await;
        let start = from_offset.min(records.len() as u64) as usize;
        let end = (start + max).min(records.len());
        Ok(records[start..end].to_vec())
    }

    async fn end_offset(&self) -> KmsResult<u64> {
        Ok(self.records.read().await.len() as u64)
    }
}

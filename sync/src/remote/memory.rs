//! In-memory remote store.
//!
//! A reference implementation of [`RemoteStore`] backed by process
//! memory: one document map per principal plus a broadcast channel
//! fanning out change snapshots. Tests and demos run against this; the
//! hosted deployment substitutes the real document collection.

use super::{RemoteSnapshot, RemoteStore};
use crate::error::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use retake_engine::QuizAttempt;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Capacity of each per-principal change channel.
const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Thread-safe, cheaply cloneable in-memory document collection.
#[derive(Debug, Clone, Default)]
pub struct MemoryRemoteStore {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    /// Documents per principal, keyed by attempt id. BTreeMap keeps
    /// snapshots deterministically ordered.
    documents: DashMap<String, BTreeMap<String, QuizAttempt>>,
    /// Change fan-out per principal.
    watchers: DashMap<String, broadcast::Sender<RemoteSnapshot>>,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot_for(&self, uid: &str) -> RemoteSnapshot {
        self.inner
            .documents
            .get(uid)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default()
    }

    fn notify(&self, uid: &str) {
        if let Some(sender) = self.inner.watchers.get(uid) {
            // nobody listening is fine
            let _ = sender.send(self.snapshot_for(uid));
        }
    }

    /// Seed documents directly, as if another client had pushed them.
    pub fn seed(&self, uid: &str, attempts: Vec<QuizAttempt>) {
        {
            let mut docs = self.inner.documents.entry(uid.to_string()).or_default();
            for attempt in attempts {
                docs.insert(attempt.attempt_id.clone(), attempt);
            }
        }
        self.notify(uid);
    }

    /// Number of documents stored for the principal.
    pub fn document_count(&self, uid: &str) -> usize {
        self.inner
            .documents
            .get(uid)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn fetch_attempts(&self, uid: &str) -> Result<Vec<QuizAttempt>> {
        Ok(self.snapshot_for(uid))
    }

    async fn commit_batch(&self, uid: &str, attempts: &[QuizAttempt]) -> Result<()> {
        if attempts.is_empty() {
            return Ok(());
        }

        {
            // the whole batch lands under one map guard, never partially
            let mut docs = self.inner.documents.entry(uid.to_string()).or_default();
            for attempt in attempts {
                docs.insert(attempt.attempt_id.clone(), attempt.clone());
            }
        }
        self.notify(uid);

        Ok(())
    }

    fn subscribe(&self, uid: &str) -> broadcast::Receiver<RemoteSnapshot> {
        self.inner
            .watchers
            .entry(uid.to_string())
            .or_insert_with(|| broadcast::channel(CHANGE_CHANNEL_CAPACITY).0)
            .subscribe()
    }
}

//! The remote attempt store contract.
//!
//! Attempts live per-principal as one document each, keyed by attempt id
//! (`users/{uid}/quizAttempts/{attemptId}` in the hosted deployment).
//! Writes carry merge-on-conflict semantics at the document level, so
//! re-pushing an already-present attempt is a safe no-op and delivery can
//! be at-least-once.

mod memory;

pub use memory::MemoryRemoteStore;

use crate::error::Result;
use async_trait::async_trait;
use retake_engine::QuizAttempt;
use tokio::sync::broadcast;

/// Documents committed per atomic batch.
pub const BATCH_WRITE_LIMIT: usize = 400;

/// A full remote snapshot for one principal, emitted on every change.
pub type RemoteSnapshot = Vec<QuizAttempt>;

/// The opaque per-principal document collection sync runs against.
#[async_trait]
pub trait RemoteStore: Send + Sync + 'static {
    /// Fetch every attempt stored for the principal.
    async fn fetch_attempts(&self, uid: &str) -> Result<Vec<QuizAttempt>>;

    /// Commit one batch of attempts as an atomic set.
    ///
    /// Callers chunk with [`push_attempts`]; a partially applied batch
    /// must never become observable.
    async fn commit_batch(&self, uid: &str, attempts: &[QuizAttempt]) -> Result<()>;

    /// Subscribe to change events for the principal.
    ///
    /// Every event carries the full remote snapshot. Dropping the
    /// receiver ends the subscription.
    fn subscribe(&self, uid: &str) -> broadcast::Receiver<RemoteSnapshot>;
}

/// Push attempts in fixed-size batches.
///
/// A mid-push failure leaves at most one partial batch uncommitted rather
/// than a scattered partial write.
pub async fn push_attempts<R: RemoteStore + ?Sized>(
    store: &R,
    uid: &str,
    attempts: &[QuizAttempt],
) -> Result<()> {
    if attempts.is_empty() {
        return Ok(());
    }

    for chunk in attempts.chunks(BATCH_WRITE_LIMIT) {
        store.commit_batch(uid, chunk).await?;
    }

    tracing::debug!(uid, count = attempts.len(), "pushed attempts to remote store");
    Ok(())
}

//! Retake Sync - cloud synchronization runtime for quiz attempt history.
//!
//! Pairs the pure [`retake_engine`] merge core with the runtime concerns
//! of a local-first client: a durable local attempt slot, the remote
//! attempt store contract, file export/import, and the orchestrator that
//! keeps all three reconciled under concurrent triggers.
//!
//! The flow mirrors the engine's guarantees: every mutation of the local
//! collection goes through the merge engine (or a direct append) and is
//! persisted before observers see it, so memory and storage never
//! disagree for longer than one step.

pub mod auth;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod remote;
pub mod storage;
pub mod transfer;

pub use auth::{AuthState, Principal};
pub use config::{ConfigError, SyncConfig};
pub use error::SyncError;
pub use orchestrator::{CloudSync, ImportNotification, SyncSnapshot, SyncStatus};
pub use remote::{push_attempts, MemoryRemoteStore, RemoteStore, BATCH_WRITE_LIMIT};
pub use storage::AttemptSlot;
pub use transfer::{export_attempts, import_attempts};

/// Generate a fresh attempt id.
///
/// Ids are v4 UUIDs: the merge engine trusts attempt ids as a global
/// identity, so they must be collision-resistant across independent
/// clients.
pub fn new_attempt_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

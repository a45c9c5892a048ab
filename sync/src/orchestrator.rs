//! The cloud sync orchestrator.
//!
//! Coordinates one-at-a-time synchronization between the local attempt
//! slot and the remote store: the initial pull+merge+push-back cycle, the
//! continuous change subscription, and the user-visible status surface.
//!
//! # Concurrency
//!
//! Sync cycles are single-flight: a trigger arriving while a cycle is in
//! progress attaches to it and observes the same outcome instead of
//! racing a second pull. Every piece of in-flight work is tagged with the
//! generation it was started under; principal changes and teardown bump
//! the generation, so a late-resolving cycle or a disposed subscription's
//! callback cannot write state for a departed principal.

use crate::auth::AuthState;
use crate::config::SyncConfig;
use crate::error::Result;
use crate::remote::{self, RemoteStore};
use crate::storage::AttemptSlot;
use chrono::{SecondsFormat, Utc};
use retake_engine::{merge, QuizAttempt};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

/// User-visible sync lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncStatus {
    /// Sync capability is not configured or the principal signed out
    #[default]
    Disabled,
    /// Enabled, waiting for a principal or a first trigger
    Idle,
    /// A pull+merge+push cycle is in progress
    Syncing,
    /// The last cycle completed
    Success,
    /// The last cycle failed; retryable by any future trigger
    Error,
}

/// Banner raised when a sync imports remote attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportNotification {
    /// Monotonic per-orchestrator id, so observers can tell a fresh
    /// banner from a lingering old one
    pub id: u64,
    /// How many attempts the cycle imported
    pub count: usize,
}

/// Observable orchestrator state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSnapshot {
    pub status: SyncStatus,
    pub error: Option<String>,
    pub last_sync_time: Option<String>,
    pub last_imported_count: usize,
    pub notification: Option<ImportNotification>,
}

/// Outcome shared with every caller attached to one sync cycle.
type SyncOutcome = Result<()>;

struct OrchestratorState {
    auth: AuthState,
    /// Bumped on principal change and teardown; stale work is discarded
    generation: u64,
    snapshot: SyncSnapshot,
    subscription: Option<JoinHandle<()>>,
}

struct Shared {
    config: SyncConfig,
    slot: AttemptSlot,
    state: Mutex<OrchestratorState>,
    state_tx: watch::Sender<SyncSnapshot>,
    /// Single-flight guard: holds the in-flight cycle's outcome channel
    in_flight: tokio::sync::Mutex<Option<broadcast::Sender<SyncOutcome>>>,
    notification_seq: AtomicU64,
}

/// Orchestrates attempt synchronization against a remote store.
///
/// Cheap to clone; clones share all state. Must be used inside a tokio
/// runtime (subscriptions and notification dismissal are spawned tasks).
pub struct CloudSync<R: RemoteStore> {
    remote: Arc<R>,
    shared: Arc<Shared>,
}

impl<R: RemoteStore> Clone for CloudSync<R> {
    fn clone(&self) -> Self {
        Self {
            remote: Arc::clone(&self.remote),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<R: RemoteStore> CloudSync<R> {
    /// Create an orchestrator over the given remote store.
    ///
    /// Starts disabled; drive it with [`CloudSync::set_auth`].
    pub fn new(config: SyncConfig, remote: R) -> Self {
        let slot = AttemptSlot::new(&config.slot_path);
        let (state_tx, _) = watch::channel(SyncSnapshot::default());

        Self {
            remote: Arc::new(remote),
            shared: Arc::new(Shared {
                config,
                slot,
                state: Mutex::new(OrchestratorState {
                    auth: AuthState::disabled(),
                    generation: 0,
                    snapshot: SyncSnapshot::default(),
                    subscription: None,
                }),
                state_tx,
                in_flight: tokio::sync::Mutex::new(None),
                notification_seq: AtomicU64::new(0),
            }),
        }
    }

    /// Current observable state.
    pub fn snapshot(&self) -> SyncSnapshot {
        self.lock_state().snapshot.clone()
    }

    /// Subscribe to state changes.
    pub fn watch_state(&self) -> watch::Receiver<SyncSnapshot> {
        self.shared.state_tx.subscribe()
    }

    /// The local attempt collection as currently persisted.
    pub fn local_attempts(&self) -> Vec<QuizAttempt> {
        self.shared.slot.load()
    }

    /// Feed an auth change into the orchestrator.
    ///
    /// Enabling with a signed-in principal starts the remote subscription
    /// and a background sync. Sign-out and disablement tear the
    /// subscription down and supersede any in-flight cycle.
    pub fn set_auth(&self, auth: AuthState) {
        let activated = {
            let mut state = self.lock_state();
            let previous = std::mem::replace(&mut state.auth, auth.clone());

            if !auth.enabled {
                Self::teardown_locked(&mut state);
                state.snapshot.status = SyncStatus::Disabled;
                state.snapshot.error = None;
                state.snapshot.notification = None;
                self.publish_locked(&state);
                None
            } else if auth.principal.is_none() {
                Self::teardown_locked(&mut state);
                // an actual sign-out reads as disabled until the next auth
                // refresh; enabling with nobody signed in is idle
                state.snapshot.status = if previous.principal.is_some() {
                    SyncStatus::Disabled
                } else {
                    SyncStatus::Idle
                };
                state.snapshot.error = None;
                state.snapshot.notification = None;
                state.snapshot.last_imported_count = 0;
                self.publish_locked(&state);
                None
            } else if previous.principal != auth.principal || !previous.enabled {
                // principal appeared or changed: restart under a fresh
                // generation
                Self::teardown_locked(&mut state);
                if state.snapshot.status == SyncStatus::Disabled {
                    state.snapshot.status = SyncStatus::Idle;
                }
                self.publish_locked(&state);
                auth.principal
                    .as_ref()
                    .map(|principal| (principal.uid.clone(), state.generation))
            } else {
                if state.snapshot.status == SyncStatus::Disabled {
                    state.snapshot.status = SyncStatus::Idle;
                    self.publish_locked(&state);
                }
                None
            }
        };

        if let Some((uid, generation)) = activated {
            tracing::info!(uid = %uid, "cloud sync activated");
            self.start_subscription(&uid, generation);

            // post-auth sync is passive: failures land in status only
            let this = self.clone();
            tokio::spawn(async move {
                if let Err(err) = this.trigger_sync().await {
                    tracing::debug!(error = %err, "background sync after sign-in failed");
                }
            });
        }
    }

    /// Tear down background work without touching auth state.
    ///
    /// Safe to call more than once.
    pub fn dispose(&self) {
        let mut state = self.lock_state();
        Self::teardown_locked(&mut state);
    }

    /// Run one pull+merge+push cycle.
    ///
    /// No-op when disabled or unauthenticated. Single-flight: if a cycle
    /// is already running, this attaches to it and returns its outcome.
    /// Errors propagate to the caller (explicit invocation); passive
    /// invocations swallow them into status.
    pub async fn trigger_sync(&self) -> Result<()> {
        let Some((uid, generation)) = self.current_principal() else {
            return Ok(());
        };

        let mut guard = self.shared.in_flight.lock().await;
        if let Some(sender) = guard.as_ref() {
            // attach to the in-flight cycle and share its outcome
            let mut rx = sender.subscribe();
            drop(guard);
            return match rx.recv().await {
                Ok(outcome) => outcome,
                Err(_) => Ok(()),
            };
        }

        let (tx, _rx) = broadcast::channel(1);
        *guard = Some(tx.clone());
        drop(guard);

        let outcome = self.perform_sync(&uid, generation).await;

        *self.shared.in_flight.lock().await = None;
        let _ = tx.send(outcome.clone());

        outcome
    }

    /// Push a single attempt right after local creation, ahead of the
    /// next full cycle. Failures surface through status only.
    pub async fn push_attempt(&self, attempt: &QuizAttempt) {
        let Some((uid, generation)) = self.current_principal() else {
            return;
        };

        match remote::push_attempts(self.remote.as_ref(), &uid, std::slice::from_ref(attempt))
            .await
        {
            Ok(()) => {
                self.update_state(generation, |snapshot| {
                    snapshot.status = SyncStatus::Success;
                    snapshot.last_sync_time = Some(now_iso());
                });
            }
            Err(err) => {
                tracing::warn!(uid = %uid, error = %err, "failed to push attempt");
                self.update_state(generation, |snapshot| {
                    snapshot.status = SyncStatus::Error;
                    snapshot.error = Some("Unable to sync attempts at this time.".to_string());
                });
            }
        }
    }

    /// Record a freshly completed attempt: append it to the local slot,
    /// then push it out. Returns the new local collection.
    pub async fn record_attempt(&self, attempt: QuizAttempt) -> Result<Vec<QuizAttempt>> {
        let attempts = self.shared.slot.append(attempt.clone())?;
        self.push_attempt(&attempt).await;
        Ok(attempts)
    }

    /// Manually dismiss the import notification.
    pub fn dismiss_notification(&self) {
        let mut state = self.lock_state();
        if state.snapshot.notification.take().is_some() {
            self.publish_locked(&state);
        }
    }

    async fn perform_sync(&self, uid: &str, generation: u64) -> Result<()> {
        self.update_state(generation, |snapshot| {
            snapshot.status = SyncStatus::Syncing;
            snapshot.error = None;
        });

        match self.sync_cycle(uid, generation).await {
            Ok(()) => {
                self.update_state(generation, |snapshot| {
                    snapshot.status = SyncStatus::Success;
                    snapshot.last_sync_time = Some(now_iso());
                });
                Ok(())
            }
            Err(err) => {
                tracing::warn!(uid = %uid, error = %err, "sync cycle failed");
                self.update_state(generation, |snapshot| {
                    snapshot.status = SyncStatus::Error;
                    snapshot.error = Some(err.to_string());
                });
                Err(err)
            }
        }
    }

    async fn sync_cycle(&self, uid: &str, generation: u64) -> Result<()> {
        let local = self.shared.slot.load();
        let remote_attempts = self.remote.fetch_attempts(uid).await?;

        let remote_ids: HashSet<&str> = remote_attempts
            .iter()
            .map(|attempt| attempt.attempt_id.as_str())
            .collect();
        let local_only: Vec<QuizAttempt> = local
            .iter()
            .filter(|attempt| !remote_ids.contains(attempt.attempt_id.as_str()))
            .cloned()
            .collect();

        let outcome = merge(local, remote_attempts);

        if !self.is_current(generation) {
            // superseded by sign-out or principal change; discard
            return Ok(());
        }

        if outcome.summary.imported_count > 0 {
            self.shared.slot.replace(&outcome.merged)?;
            self.raise_notification(generation, outcome.summary.imported_count);
        }

        if !local_only.is_empty() {
            if !self.is_current(generation) {
                return Ok(());
            }
            remote::push_attempts(self.remote.as_ref(), uid, &local_only).await?;
        }

        Ok(())
    }

    /// Merge-only path driven by the remote subscription. No push-back:
    /// echoing every remote event outward would create redundant writes.
    fn apply_remote_snapshot(&self, remote_attempts: Vec<QuizAttempt>, generation: u64) {
        let local = self.shared.slot.load();
        let outcome = merge(local, remote_attempts);

        if !self.is_current(generation) {
            return;
        }

        if outcome.summary.imported_count > 0 {
            if let Err(err) = self.shared.slot.replace(&outcome.merged) {
                self.update_state(generation, |snapshot| {
                    snapshot.status = SyncStatus::Error;
                    snapshot.error = Some(err.to_string());
                });
                return;
            }
            self.raise_notification(generation, outcome.summary.imported_count);
        }

        self.update_state(generation, |snapshot| {
            snapshot.status = if snapshot.status == SyncStatus::Disabled {
                SyncStatus::Idle
            } else {
                SyncStatus::Success
            };
            snapshot.error = None;
            snapshot.last_sync_time = Some(now_iso());
        });
    }

    fn start_subscription(&self, uid: &str, generation: u64) {
        let mut rx = self.remote.subscribe(uid);
        let this = self.clone();
        let task_uid = uid.to_string();

        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(snapshot) => {
                        if !this.is_current(generation) {
                            break;
                        }
                        this.apply_remote_snapshot(snapshot, generation);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            uid = %task_uid,
                            skipped,
                            "remote subscription lagged, dropping stale snapshots"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let mut state = self.lock_state();
        if state.generation == generation {
            state.subscription = Some(handle);
        } else {
            // torn down while we were spawning
            handle.abort();
        }
    }

    fn raise_notification(&self, generation: u64, count: usize) {
        let id = self.shared.notification_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let applied = self.update_state(generation, |snapshot| {
            snapshot.last_imported_count = count;
            snapshot.notification = Some(ImportNotification { id, count });
        });

        if applied {
            tracing::info!(count, "imported attempts from remote store");
            let this = self.clone();
            let delay = self.shared.config.notify_dismiss_after;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                this.dismiss_if(id);
            });
        }
    }

    fn dismiss_if(&self, id: u64) {
        let mut state = self.lock_state();
        if state.snapshot.notification.map(|n| n.id) == Some(id) {
            state.snapshot.notification = None;
            self.publish_locked(&state);
        }
    }

    fn current_principal(&self) -> Option<(String, u64)> {
        let state = self.lock_state();
        if !state.auth.enabled {
            return None;
        }
        state
            .auth
            .principal
            .as_ref()
            .map(|principal| (principal.uid.clone(), state.generation))
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock_state().generation == generation
    }

    /// Apply a state change unless `generation` has been superseded.
    fn update_state(&self, generation: u64, apply: impl FnOnce(&mut SyncSnapshot)) -> bool {
        let mut state = self.lock_state();
        if state.generation != generation {
            return false;
        }
        apply(&mut state.snapshot);
        self.publish_locked(&state);
        true
    }

    fn teardown_locked(state: &mut OrchestratorState) {
        state.generation += 1;
        if let Some(handle) = state.subscription.take() {
            handle.abort();
        }
    }

    fn publish_locked(&self, state: &OrchestratorState) {
        let _ = self.shared.state_tx.send(state.snapshot.clone());
    }

    fn lock_state(&self) -> MutexGuard<'_, OrchestratorState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryRemoteStore;
    use tempfile::tempdir;

    fn attempt(id: &str) -> QuizAttempt {
        QuizAttempt {
            attempt_id: id.to_string(),
            quiz_id: "quiz-1".into(),
            quiz_title: "Networking Basics".into(),
            started_at: "2024-05-01T10:00:00Z".into(),
            completed_at: "2024-05-01T10:08:30Z".into(),
            score_percent: 80,
            correct_count: 4,
            total_count: 5,
            answers: Vec::new(),
        }
    }

    fn orchestrator(dir: &tempfile::TempDir) -> CloudSync<MemoryRemoteStore> {
        CloudSync::new(
            SyncConfig::new(dir.path().join("attempts.json")),
            MemoryRemoteStore::new(),
        )
    }

    #[tokio::test]
    async fn starts_disabled() {
        let dir = tempdir().unwrap();
        let sync = orchestrator(&dir);

        assert_eq!(sync.snapshot().status, SyncStatus::Disabled);
    }

    #[tokio::test]
    async fn enabling_without_principal_is_idle() {
        let dir = tempdir().unwrap();
        let sync = orchestrator(&dir);

        sync.set_auth(AuthState::signed_out());

        assert_eq!(sync.snapshot().status, SyncStatus::Idle);
    }

    #[tokio::test]
    async fn disabling_resets_to_disabled() {
        let dir = tempdir().unwrap();
        let sync = orchestrator(&dir);

        sync.set_auth(AuthState::signed_out());
        sync.set_auth(AuthState::disabled());

        assert_eq!(sync.snapshot().status, SyncStatus::Disabled);
    }

    #[tokio::test]
    async fn trigger_without_principal_is_a_no_op() {
        let dir = tempdir().unwrap();
        let sync = orchestrator(&dir);

        sync.set_auth(AuthState::signed_out());
        sync.trigger_sync().await.unwrap();

        assert_eq!(sync.snapshot().status, SyncStatus::Idle);
        assert!(sync.local_attempts().is_empty());
    }

    #[tokio::test]
    async fn manual_dismiss_clears_notification() {
        let dir = tempdir().unwrap();
        let sync = orchestrator(&dir);
        sync.set_auth(AuthState::signed_in("user-1"));

        // no notification yet; dismissing is harmless
        sync.dismiss_notification();
        assert_eq!(sync.snapshot().notification, None);
    }

    #[tokio::test]
    async fn record_attempt_persists_locally_even_when_disabled() {
        let dir = tempdir().unwrap();
        let sync = orchestrator(&dir);

        let attempts = sync.record_attempt(attempt("a-1")).await.unwrap();

        assert_eq!(attempts.len(), 1);
        assert_eq!(sync.local_attempts().len(), 1);
        // nothing was pushed since sync is disabled
        assert_eq!(sync.snapshot().status, SyncStatus::Disabled);
    }

    #[tokio::test]
    async fn dispose_is_idempotent() {
        let dir = tempdir().unwrap();
        let sync = orchestrator(&dir);

        sync.set_auth(AuthState::signed_in("user-1"));
        sync.dispose();
        sync.dispose();
    }
}

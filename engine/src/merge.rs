//! Set-union reconciliation of attempt collections.
//!
//! This is the core of convergence. The same merge runs against all three
//! attempt sources (local storage, file import, remote snapshots), so any
//! grouping of merges settles on the same final set.
//!
//! # Algorithm
//!
//! 1. Seed a membership set with the ids already stored
//! 2. Walk `incoming` in order, appending unseen attempts after `existing`
//! 3. An id seen before is skipped wholesale - the existing record's
//!    content always wins, never a field-level merge
//!
//! The merge is idempotent (`merge(x, x)` imports nothing) and associative
//! over set membership.

use crate::QuizAttempt;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Accounting for one merge: how many incoming records were new versus
/// already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeSummary {
    /// Incoming attempts appended to the collection
    pub imported_count: usize,
    /// Incoming attempts discarded as duplicates
    pub skipped_count: usize,
}

/// Result of merging an incoming collection into an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    /// Existing attempts in their original order, followed by the newly
    /// imported ones in incoming order
    pub merged: Vec<QuizAttempt>,
    pub summary: MergeSummary,
}

/// Merge `incoming` into `existing`, deduplicated by attempt id.
///
/// When the same id appears in both collections the existing record wins
/// and the incoming duplicate is counted as skipped. Duplicates within
/// `incoming` itself keep the first occurrence.
pub fn merge(existing: Vec<QuizAttempt>, incoming: Vec<QuizAttempt>) -> MergeOutcome {
    let total_incoming = incoming.len();
    let mut seen: HashSet<String> = existing
        .iter()
        .map(|attempt| attempt.attempt_id.clone())
        .collect();

    let mut merged = existing;
    let mut imported_count = 0;
    for attempt in incoming {
        if seen.insert(attempt.attempt_id.clone()) {
            merged.push(attempt);
            imported_count += 1;
        }
    }

    MergeOutcome {
        merged,
        summary: MergeSummary {
            imported_count,
            skipped_count: total_incoming - imported_count,
        },
    }
}

//! # Retake Engine
//!
//! The attempt reconciliation core for the Retake quiz application.
//!
//! This crate provides the logic that keeps a quiz attempt history
//! consistent across its three sources - local storage, transfer files,
//! and a remote attempt store - without ever losing or duplicating a
//! completed attempt.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine has no knowledge of files, network, or clocks
//! - **Deterministic**: same inputs always produce the same outputs
//! - **Testable**: pure logic, no mocks needed
//! - **Portable**: runs anywhere Rust runs (native, WASM, embedded)
//!
//! ## Core Concepts
//!
//! ### Attempts
//!
//! A [`QuizAttempt`] is one completed run of a quiz: a globally unique
//! `attempt_id`, a denormalized quiz reference, start/completion stamps, a
//! score summary, and the ordered [`QuestionAnswer`] list. Attempts are
//! immutable once created.
//!
//! ### Merge
//!
//! [`merge`] performs set-union reconciliation of two attempt collections
//! keyed by `attempt_id`. It is idempotent and associative over set
//! membership; the [`MergeSummary`] reports how many incoming records were
//! newly imported versus skipped as duplicates.
//!
//! ### Transfer
//!
//! [`TransferEnvelope`] is the versioned portable document used for file
//! export/import. Parsing validates every attempt strictly ([`validate`])
//! and never accepts a partial batch.
//!
//! ## Quick Start
//!
//! ```rust
//! use retake_engine::{merge, QuizAttempt};
//!
//! fn attempt(id: &str) -> QuizAttempt {
//!     QuizAttempt {
//!         attempt_id: id.to_string(),
//!         quiz_id: "quiz-1".into(),
//!         quiz_title: "Networking Basics".into(),
//!         started_at: "2024-05-01T10:00:00Z".into(),
//!         completed_at: "2024-05-01T10:08:30Z".into(),
//!         score_percent: 80,
//!         correct_count: 4,
//!         total_count: 5,
//!         answers: Vec::new(),
//!     }
//! }
//!
//! let local = vec![attempt("a-1")];
//! let remote = vec![attempt("a-1"), attempt("a-2")];
//!
//! let outcome = merge(local, remote);
//! assert_eq!(outcome.merged.len(), 2);
//! assert_eq!(outcome.summary.imported_count, 1);
//! assert_eq!(outcome.summary.skipped_count, 1);
//! ```

pub mod attempt;
pub mod error;
pub mod history;
pub mod merge;
pub mod transfer;
pub mod validate;

// Re-export main types at crate root
pub use attempt::{QuestionAnswer, QuizAttempt};
pub use error::Error;
pub use history::{
    attempts_for_quiz, most_recent_by_quiz, score_answers, taken_quiz_ids, ScoreSummary,
};
pub use merge::{merge, MergeOutcome, MergeSummary};
pub use transfer::{TransferEnvelope, TRANSFER_FORMAT_VERSION};
pub use validate::{validate_attempt, validate_attempts};

/// Type aliases for clarity
pub type AttemptId = String;
pub type QuizId = String;

//! File import/export on top of the engine transfer codec.
//!
//! The engine stays clock-free; this layer stamps exports with the
//! current time and wires imports through the merge engine so a bad file
//! never touches the existing collection.

use crate::error::Result;
use chrono::{SecondsFormat, Utc};
use retake_engine::{merge, MergeOutcome, QuizAttempt, TransferEnvelope};

/// Build and serialize an export of the given attempts, stamped with the
/// current time.
pub fn export_attempts(attempts: Vec<QuizAttempt>) -> Result<String> {
    let exported_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let envelope = TransferEnvelope::new(attempts, exported_at);
    Ok(envelope.to_json_pretty()?)
}

/// Parse a transfer file and merge its attempts into `existing`.
///
/// Parse and validation failures propagate before any merge happens, so
/// the existing collection is untouched by an invalid file.
pub fn import_attempts(existing: Vec<QuizAttempt>, text: &str) -> Result<MergeOutcome> {
    let envelope = TransferEnvelope::from_json(text)?;
    Ok(merge(existing, envelope.attempts))
}

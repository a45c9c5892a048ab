//! Durable local storage for the attempt collection.
//!
//! A single file slot holding a JSON array of attempts. Reads never fail:
//! an absent or corrupt slot degrades to the empty collection. Writes
//! replace the whole slot atomically (temp file + rename). No merge
//! happens at this layer; callers merge first and hand over the full
//! authoritative collection.

use crate::error::{Result, SyncError};
use retake_engine::QuizAttempt;
use std::fs;
use std::path::{Path, PathBuf};

/// The named slot the local attempt history lives in.
#[derive(Debug, Clone)]
pub struct AttemptSlot {
    path: PathBuf,
}

impl AttemptSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored collection.
    ///
    /// Absent or corrupt data reads back as empty - callers never see a
    /// storage read error.
    pub fn load(&self) -> Vec<QuizAttempt> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };

        match serde_json::from_str::<Vec<QuizAttempt>>(&raw) {
            Ok(attempts) => attempts,
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "attempt slot is corrupt, treating as empty"
                );
                Vec::new()
            }
        }
    }

    /// Atomically overwrite the slot with a new collection.
    pub fn replace(&self, attempts: &[QuizAttempt]) -> Result<()> {
        let json =
            serde_json::to_string(attempts).map_err(|e| SyncError::Storage(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| SyncError::Storage(e.to_string()))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| SyncError::Storage(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| SyncError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Append a single attempt (the new-attempt path) and return the new
    /// collection.
    pub fn append(&self, attempt: QuizAttempt) -> Result<Vec<QuizAttempt>> {
        let mut attempts = self.load();
        attempts.push(attempt);
        self.replace(&attempts)?;
        Ok(attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    #[test]
    fn missing_slot_loads_empty() {
        let dir = tempdir().unwrap();
        let slot = AttemptSlot::new(dir.path().join("attempts.json"));

        assert!(slot.load().is_empty());
    }

    #[test]
    fn corrupt_slot_loads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("attempts.json");
        fs::write(&path, "{ not json").unwrap();

        let slot = AttemptSlot::new(&path);
        assert!(slot.load().is_empty());
    }

    #[test]
    fn non_array_slot_loads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("attempts.json");
        fs::write(&path, r#"{"attempts": []}"#).unwrap();

        let slot = AttemptSlot::new(&path);
        assert!(slot.load().is_empty());
    }

    #[test]
    fn replace_then_load_roundtrip() {
        let dir = tempdir().unwrap();
        let slot = AttemptSlot::new(dir.path().join("attempts.json"));

        let attempts = vec![attempt("a-1"), attempt("a-2")];
        slot.replace(&attempts).unwrap();

        assert_eq!(slot.load(), attempts);
    }

    #[test]
    fn replace_overwrites_not_merges() {
        let dir = tempdir().unwrap();
        let slot = AttemptSlot::new(dir.path().join("attempts.json"));

        slot.replace(&[attempt("a-1")]).unwrap();
        slot.replace(&[attempt("a-2")]).unwrap();

        let stored = slot.load();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].attempt_id, "a-2");
    }

    #[test]
    fn append_grows_collection() {
        let dir = tempdir().unwrap();
        let slot = AttemptSlot::new(dir.path().join("attempts.json"));

        slot.append(attempt("a-1")).unwrap();
        let attempts = slot.append(attempt("a-2")).unwrap();

        assert_eq!(attempts.len(), 2);
        assert_eq!(slot.load(), attempts);
    }

    #[test]
    fn replace_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let slot = AttemptSlot::new(dir.path().join("nested/data/attempts.json"));

        slot.replace(&[attempt("a-1")]).unwrap();
        assert_eq!(slot.load().len(), 1);
    }
}

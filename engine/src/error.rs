//! Error types for the Retake engine.

use thiserror::Error;

/// All possible errors from the Retake engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Parse errors (transfer document level)
    #[error("transfer file is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("transfer file must be an object")]
    NotAnObject,

    #[error("transfer file is missing an attempts array")]
    MissingAttempts,

    // Validation errors (per attempt record)
    #[error("attempt at index {index} is not an object")]
    AttemptNotAnObject { index: usize },

    #[error("attempt at index {index} is missing {field}")]
    MissingField { index: usize, field: String },

    #[error("attempt at index {index} has invalid {field}")]
    InvalidField { index: usize, field: String },

    #[error("answer at index {answer_index} in attempt {index} is invalid")]
    InvalidAnswer { index: usize, answer_index: usize },
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

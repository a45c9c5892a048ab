//! Structural validation of untyped attempt records.
//!
//! File import and remote pulls hand the engine arbitrary JSON. Validation
//! is fail-fast: the first invalid record aborts the whole batch, so a
//! partially valid batch is never accepted.

use crate::{error::Result, Error, QuestionAnswer, QuizAttempt};
use serde_json::{Map, Value};

fn require_string(
    obj: &Map<String, Value>,
    field: &'static str,
    index: usize,
) -> Result<String> {
    match obj.get(field).and_then(Value::as_str) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(Error::MissingField {
            index,
            field: field.into(),
        }),
    }
}

fn require_count(obj: &Map<String, Value>, field: &'static str, index: usize) -> Result<u32> {
    obj.get(field)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or(Error::InvalidField {
            index,
            field: field.into(),
        })
}

fn validate_answer(value: &Value, index: usize, answer_index: usize) -> Result<QuestionAnswer> {
    let invalid = || Error::InvalidAnswer {
        index,
        answer_index,
    };

    let obj = value.as_object().ok_or_else(invalid)?;
    let question_id = obj
        .get("questionId")
        .and_then(Value::as_str)
        .ok_or_else(invalid)?;
    let question_number = obj
        .get("questionNumber")
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(invalid)?;
    let selected_option_id = obj
        .get("selectedOptionId")
        .and_then(Value::as_str)
        .ok_or_else(invalid)?;
    let correct_option_id = obj
        .get("correctOptionId")
        .and_then(Value::as_str)
        .ok_or_else(invalid)?;
    let is_correct = obj
        .get("isCorrect")
        .and_then(Value::as_bool)
        .ok_or_else(invalid)?;

    Ok(QuestionAnswer {
        question_id: question_id.to_string(),
        question_number,
        selected_option_id: selected_option_id.to_string(),
        correct_option_id: correct_option_id.to_string(),
        is_correct,
    })
}

/// Validate a single untyped value as a [`QuizAttempt`].
///
/// `index` is the record's position in the surrounding batch and is
/// reported in every error.
pub fn validate_attempt(value: &Value, index: usize) -> Result<QuizAttempt> {
    let obj = value
        .as_object()
        .ok_or(Error::AttemptNotAnObject { index })?;

    let attempt_id = require_string(obj, "attemptId", index)?;
    let quiz_id = require_string(obj, "quizId", index)?;
    let quiz_title = require_string(obj, "quizTitle", index)?;
    let started_at = require_string(obj, "startedAt", index)?;
    let completed_at = require_string(obj, "completedAt", index)?;

    let score_percent = require_count(obj, "scorePercent", index)?;
    let correct_count = require_count(obj, "correctCount", index)?;
    let total_count = require_count(obj, "totalCount", index)?;

    let answers = obj
        .get("answers")
        .and_then(Value::as_array)
        .ok_or(Error::MissingField {
            index,
            field: "answers".into(),
        })?;
    let answers = answers
        .iter()
        .enumerate()
        .map(|(answer_index, answer)| validate_answer(answer, index, answer_index))
        .collect::<Result<Vec<_>>>()?;

    Ok(QuizAttempt {
        attempt_id,
        quiz_id,
        quiz_title,
        started_at,
        completed_at,
        score_percent,
        correct_count,
        total_count,
        answers,
    })
}

/// Validate a batch of untyped values, aborting on the first failure.
pub fn validate_attempts(values: &[Value]) -> Result<Vec<QuizAttempt>> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| validate_attempt(value, index))
        .collect()
}

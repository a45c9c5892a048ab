//! Attempt records - the unit of quiz history.

use crate::{AttemptId, QuizId};
use serde::{Deserialize, Serialize};

/// One answered question within an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnswer {
    /// Question this answer belongs to
    pub question_id: String,
    /// Ordinal number of the question within the quiz
    pub question_number: u32,
    /// Option the user picked
    pub selected_option_id: String,
    /// Option that was correct
    pub correct_option_id: String,
    /// Whether the selection matched the correct option
    pub is_correct: bool,
}

/// A completed run of a quiz.
///
/// Attempts are immutable once recorded: merge only ever adds or omits
/// whole attempts, never edits fields of an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    /// Globally unique id assigned at creation time; the merge identity
    /// and deduplication key
    pub attempt_id: AttemptId,
    /// Denormalized quiz reference - the quiz may later change or
    /// disappear, the attempt stays valid
    pub quiz_id: QuizId,
    /// Quiz title at the time the attempt was taken
    pub quiz_title: String,
    /// ISO-8601 timestamp
    pub started_at: String,
    /// ISO-8601 timestamp; sort key for "most recent attempt"
    pub completed_at: String,
    /// Rounded percentage, 0 when the quiz had no questions
    pub score_percent: u32,
    /// Questions answered correctly
    pub correct_count: u32,
    /// Questions in the quiz at attempt time
    pub total_count: u32,
    /// Answers ordered by question number
    pub answers: Vec<QuestionAnswer>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_attempt() -> QuizAttempt {
        QuizAttempt {
            attempt_id: "attempt-1".into(),
            quiz_id: "quiz-1".into(),
            quiz_title: "Networking Basics".into(),
            started_at: "2024-05-01T10:00:00.000Z".into(),
            completed_at: "2024-05-01T10:08:30.000Z".into(),
            score_percent: 67,
            correct_count: 2,
            total_count: 3,
            answers: vec![QuestionAnswer {
                question_id: "q-1".into(),
                question_number: 1,
                selected_option_id: "opt-a".into(),
                correct_option_id: "opt-a".into(),
                is_correct: true,
            }],
        }
    }

    #[test]
    fn serialization_roundtrip() {
        let attempt = sample_attempt();

        let json = serde_json::to_string(&attempt).unwrap();
        let parsed: QuizAttempt = serde_json::from_str(&json).unwrap();

        assert_eq!(attempt, parsed);
    }

    #[test]
    fn wire_shape_is_camel_case() {
        let value = serde_json::to_value(sample_attempt()).unwrap();

        assert_eq!(value["attemptId"], json!("attempt-1"));
        assert_eq!(value["quizTitle"], json!("Networking Basics"));
        assert_eq!(value["scorePercent"], json!(67));
        assert_eq!(value["answers"][0]["questionNumber"], json!(1));
        assert_eq!(value["answers"][0]["isCorrect"], json!(true));
    }

    #[test]
    fn deserializes_wire_document() {
        let doc = json!({
            "attemptId": "a-9",
            "quizId": "quiz-2",
            "quizTitle": "History",
            "startedAt": "2024-06-01T09:00:00Z",
            "completedAt": "2024-06-01T09:05:00Z",
            "scorePercent": 100,
            "correctCount": 1,
            "totalCount": 1,
            "answers": []
        });

        let attempt: QuizAttempt = serde_json::from_value(doc).unwrap();
        assert_eq!(attempt.attempt_id, "a-9");
        assert_eq!(attempt.total_count, 1);
        assert!(attempt.answers.is_empty());
    }
}

//! Queries over an attempt collection.
//!
//! Display-side helpers: grouping and ordering by quiz and completion
//! time. `completed_at` stamps are RFC 3339; an unparseable stamp sorts as
//! the epoch instead of poisoning the whole view.

use crate::{QuestionAnswer, QuizAttempt};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

fn completed_instant(attempt: &QuizAttempt) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&attempt.completed_at)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// The most recent attempt per quiz, keyed by quiz id.
pub fn most_recent_by_quiz(attempts: &[QuizAttempt]) -> HashMap<String, &QuizAttempt> {
    let mut latest: HashMap<String, &QuizAttempt> = HashMap::new();
    for attempt in attempts {
        match latest.get(attempt.quiz_id.as_str()) {
            Some(existing) if completed_instant(attempt) <= completed_instant(existing) => {}
            _ => {
                latest.insert(attempt.quiz_id.clone(), attempt);
            }
        }
    }
    latest
}

/// Ids of every quiz that has at least one attempt.
pub fn taken_quiz_ids(attempts: &[QuizAttempt]) -> HashSet<String> {
    attempts
        .iter()
        .filter(|attempt| !attempt.quiz_id.is_empty())
        .map(|attempt| attempt.quiz_id.clone())
        .collect()
}

/// All attempts for one quiz, newest first.
pub fn attempts_for_quiz<'a>(
    attempts: &'a [QuizAttempt],
    quiz_id: &str,
) -> Vec<&'a QuizAttempt> {
    let mut matching: Vec<&QuizAttempt> = attempts
        .iter()
        .filter(|attempt| attempt.quiz_id == quiz_id)
        .collect();
    matching.sort_by(|a, b| completed_instant(b).cmp(&completed_instant(a)));
    matching
}

/// Summary score for an answer set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSummary {
    pub correct_count: u32,
    pub total_count: u32,
    /// `round(correct / total * 100)`, 0 when the quiz had no questions
    pub score_percent: u32,
}

/// Order answers by question number and compute the attempt score.
pub fn score_answers(
    mut answers: Vec<QuestionAnswer>,
    total_count: u32,
) -> (Vec<QuestionAnswer>, ScoreSummary) {
    answers.sort_by_key(|answer| answer.question_number);
    let correct_count = answers.iter().filter(|answer| answer.is_correct).count() as u32;
    let score_percent = if total_count > 0 {
        (f64::from(correct_count) / f64::from(total_count) * 100.0).round() as u32
    } else {
        0
    };
    (
        answers,
        ScoreSummary {
            correct_count,
            total_count,
            score_percent,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(id: &str, quiz_id: &str, completed_at: &str) -> QuizAttempt {
        QuizAttempt {
            attempt_id: id.to_string(),
            quiz_id: quiz_id.to_string(),
            quiz_title: "Quiz".into(),
            started_at: "2024-05-01T10:00:00Z".into(),
            completed_at: completed_at.to_string(),
            score_percent: 0,
            correct_count: 0,
            total_count: 0,
            answers: Vec::new(),
        }
    }

    fn answer(number: u32, correct: bool) -> QuestionAnswer {
        QuestionAnswer {
            question_id: format!("q-{number}"),
            question_number: number,
            selected_option_id: "opt-a".into(),
            correct_option_id: if correct { "opt-a" } else { "opt-b" }.into(),
            is_correct: correct,
        }
    }

    #[test]
    fn most_recent_picks_latest_completion() {
        let attempts = vec![
            attempt("a-1", "quiz-1", "2024-05-01T10:00:00Z"),
            attempt("a-2", "quiz-1", "2024-05-03T10:00:00Z"),
            attempt("a-3", "quiz-1", "2024-05-02T10:00:00Z"),
            attempt("a-4", "quiz-2", "2024-01-01T10:00:00Z"),
        ];

        let latest = most_recent_by_quiz(&attempts);

        assert_eq!(latest.len(), 2);
        assert_eq!(latest["quiz-1"].attempt_id, "a-2");
        assert_eq!(latest["quiz-2"].attempt_id, "a-4");
    }

    #[test]
    fn most_recent_keeps_first_on_equal_stamps() {
        let attempts = vec![
            attempt("a-1", "quiz-1", "2024-05-01T10:00:00Z"),
            attempt("a-2", "quiz-1", "2024-05-01T10:00:00Z"),
        ];

        let latest = most_recent_by_quiz(&attempts);
        assert_eq!(latest["quiz-1"].attempt_id, "a-1");
    }

    #[test]
    fn taken_ids_skip_empty_quiz_id() {
        let attempts = vec![
            attempt("a-1", "quiz-1", "2024-05-01T10:00:00Z"),
            attempt("a-2", "", "2024-05-01T10:00:00Z"),
            attempt("a-3", "quiz-1", "2024-05-02T10:00:00Z"),
        ];

        let ids = taken_quiz_ids(&attempts);
        assert_eq!(ids, HashSet::from(["quiz-1".to_string()]));
    }

    #[test]
    fn attempts_for_quiz_sorted_newest_first() {
        let attempts = vec![
            attempt("a-1", "quiz-1", "2024-05-01T10:00:00Z"),
            attempt("a-2", "quiz-2", "2024-05-05T10:00:00Z"),
            attempt("a-3", "quiz-1", "2024-05-03T10:00:00Z"),
        ];

        let for_quiz = attempts_for_quiz(&attempts, "quiz-1");

        let ids: Vec<&str> = for_quiz.iter().map(|a| a.attempt_id.as_str()).collect();
        assert_eq!(ids, vec!["a-3", "a-1"]);
    }

    #[test]
    fn unparseable_stamp_sorts_as_epoch() {
        let attempts = vec![
            attempt("a-1", "quiz-1", "not a timestamp"),
            attempt("a-2", "quiz-1", "1970-01-02T00:00:00Z"),
        ];

        let for_quiz = attempts_for_quiz(&attempts, "quiz-1");
        assert_eq!(for_quiz[0].attempt_id, "a-2");
    }

    #[test]
    fn scores_ordered_answers() {
        let answers = vec![answer(3, true), answer(1, false), answer(2, true)];

        let (ordered, summary) = score_answers(answers, 3);

        let numbers: Vec<u32> = ordered.iter().map(|a| a.question_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(summary.correct_count, 2);
        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.score_percent, 67);
    }

    #[test]
    fn empty_quiz_scores_zero() {
        let (ordered, summary) = score_answers(Vec::new(), 0);

        assert!(ordered.is_empty());
        assert_eq!(summary.score_percent, 0);
    }
}

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::scoring;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizResultError {
    #[error("score {score} exceeds total question count {total}")]
    ScoreOutOfRange { score: u32, total: u32 },

    #[error("answer count {answers} does not match question count {total}")]
    AnswerCountMismatch { answers: usize, total: u32 },
}

//
// ─── RESULT ────────────────────────────────────────────────────────────────────
//

/// The outcome of one completed attempt.
///
/// Results are immutable once written: one record per attempt, never updated
/// or deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    subject_name: String,
    score: u32,
    total_questions: u32,
    answers: Vec<String>,
    created_at: DateTime<Utc>,
}

impl QuizResult {
    /// Builds a result at finalization time.
    ///
    /// # Errors
    ///
    /// Returns `QuizResultError` when the score exceeds the question count or
    /// the answer sequence length does not match it.
    pub fn new(
        subject_name: impl Into<String>,
        score: u32,
        total_questions: u32,
        answers: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, QuizResultError> {
        if score > total_questions {
            return Err(QuizResultError::ScoreOutOfRange {
                score,
                total: total_questions,
            });
        }
        if answers.len() != total_questions as usize {
            return Err(QuizResultError::AnswerCountMismatch {
                answers: answers.len(),
                total: total_questions,
            });
        }

        Ok(Self {
            subject_name: subject_name.into(),
            score,
            total_questions,
            answers,
            created_at,
        })
    }

    #[must_use]
    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The attempt's score as a rounded percentage.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        scoring::percentage(self.score, self.total_questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn new_rejects_score_above_total() {
        let err = QuizResult::new("Algebra", 16, 15, vec![String::new(); 15], fixed_now())
            .unwrap_err();
        assert_eq!(
            err,
            QuizResultError::ScoreOutOfRange {
                score: 16,
                total: 15
            }
        );
    }

    #[test]
    fn new_rejects_answer_count_mismatch() {
        let err =
            QuizResult::new("Algebra", 3, 15, vec![String::new(); 10], fixed_now()).unwrap_err();
        assert_eq!(
            err,
            QuizResultError::AnswerCountMismatch {
                answers: 10,
                total: 15
            }
        );
    }

    #[test]
    fn percentage_is_rounded() {
        let result =
            QuizResult::new("Fizika", 7, 15, vec![String::new(); 15], fixed_now()).unwrap();
        assert_eq!(result.percentage(), 47);
    }
}

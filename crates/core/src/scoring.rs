//! Deterministic scoring of recorded answers against a question set.

use crate::model::Question;

/// Counts positions where the recorded answer exactly equals the question's
/// correct answer.
///
/// The comparison is case-sensitive with no trimming and no partial credit.
/// Positions beyond the shorter of the two sequences score nothing; an empty
/// string never matches a real correct answer, so unanswered questions are
/// simply wrong.
#[must_use]
pub fn score(questions: &[Question], answers: &[String]) -> u32 {
    let matches = questions
        .iter()
        .zip(answers)
        .filter(|(question, answer)| question.correct_answer() == answer.as_str())
        .count();
    u32::try_from(matches).unwrap_or(u32::MAX)
}

/// `score / total` as a whole percentage, rounded half-up; 0 when `total`
/// is 0.
#[must_use]
pub fn percentage(score: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let pct = f64::from(score) / f64::from(total) * 100.0;
    pct.round() as u32
}

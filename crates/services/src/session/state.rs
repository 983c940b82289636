use chrono::{DateTime, Duration, Utc};

use quiz_core::model::{Question, QuizSubject};
use quiz_core::scoring;

use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Lifecycle of one attempt. `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    InProgress,
    Finished,
}

/// What a committed step led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced,
    Finished(FinishedAttempt),
}

/// The scored outcome of a finalized attempt, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedAttempt {
    pub subject_name: String,
    pub score: u32,
    pub total_questions: u32,
    pub answers: Vec<String>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory state machine for one attempt at a subject.
///
/// Answers live in a fixed-length sequence sized to the question count,
/// defaulting to empty strings; a choice is first held as pending and only
/// committed into the sequence by `next` or finalization. Nothing here is
/// persisted mid-flight.
#[derive(Debug, Clone)]
pub struct QuizSession {
    subject: QuizSubject,
    current_index: usize,
    answers: Vec<String>,
    pending: Option<String>,
    deadline: DateTime<Utc>,
    status: SessionStatus,
}

impl QuizSession {
    /// Start an attempt at `subject` with the given time budget.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptySubject` when the subject has no
    /// questions.
    pub fn new(
        subject: QuizSubject,
        now: DateTime<Utc>,
        budget_secs: u64,
    ) -> Result<Self, SessionError> {
        if subject.question_count() == 0 {
            return Err(SessionError::EmptySubject);
        }

        let answers = vec![String::new(); subject.question_count()];
        let deadline = now + Duration::seconds(i64::try_from(budget_secs).unwrap_or(i64::MAX));
        Ok(Self {
            subject,
            current_index: 0,
            answers,
            pending: None,
            deadline,
            status: SessionStatus::InProgress,
        })
    }

    #[must_use]
    pub fn subject(&self) -> &QuizSubject {
        &self.subject
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The question currently shown; `None` once the attempt is finished.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_finished() {
            return None;
        }
        self.subject.questions().get(self.current_index)
    }

    #[must_use]
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    #[must_use]
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    #[must_use]
    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status == SessionStatus::Finished
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.subject.question_count(),
            position: (self.current_index + 1).min(self.subject.question_count()),
            answered: self.answers.iter().filter(|a| !a.is_empty()).count(),
            is_finished: self.is_finished(),
        }
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        if self.is_finished() {
            return Err(SessionError::AlreadyFinished);
        }
        Ok(())
    }

    /// Records a not-yet-committed choice for the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyFinished` after finalization; the
    /// attempt is unchanged.
    pub fn select_pending(&mut self, option: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        self.pending = Some(option.into());
        Ok(())
    }

    /// Commits the pending choice (or an empty string) into the answer
    /// sequence and advances; on the last question this finalizes the
    /// attempt instead.
    ///
    /// When advancing onto a question that was answered before, that answer
    /// is restored as the new pending choice.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyFinished` after finalization.
    pub fn next(&mut self) -> Result<StepOutcome, SessionError> {
        self.ensure_in_progress()?;

        self.commit_pending();
        if self.current_index + 1 < self.subject.question_count() {
            self.current_index += 1;
            self.restore_pending();
            Ok(StepOutcome::Advanced)
        } else {
            Ok(StepOutcome::Finished(self.finalize()?))
        }
    }

    /// Moves back one question, restoring the answer recorded there as the
    /// pending choice. The committed answer sequence is not altered; an
    /// uncommitted pending choice for the current question is discarded.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoPreviousQuestion` on the first question and
    /// `SessionError::AlreadyFinished` after finalization.
    pub fn previous(&mut self) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        if self.current_index == 0 {
            return Err(SessionError::NoPreviousQuestion);
        }

        self.current_index -= 1;
        self.restore_pending();
        Ok(())
    }

    /// Commits the pending choice, scores the attempt, and moves to the
    /// terminal state.
    ///
    /// Unanswered questions stay empty strings, which can never equal a
    /// real correct answer and therefore score as wrong.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyFinished` when called twice; the guard
    /// is what makes a user-triggered finish and the expiry callback safe
    /// to race.
    pub fn finalize(&mut self) -> Result<FinishedAttempt, SessionError> {
        self.ensure_in_progress()?;

        self.commit_pending();
        self.status = SessionStatus::Finished;

        let score = scoring::score(self.subject.questions(), &self.answers);
        Ok(FinishedAttempt {
            subject_name: self.subject.name().to_owned(),
            score,
            total_questions: u32::try_from(self.subject.question_count()).unwrap_or(u32::MAX),
            answers: self.answers.clone(),
        })
    }

    fn commit_pending(&mut self) {
        if let Some(slot) = self.answers.get_mut(self.current_index) {
            *slot = self.pending.take().unwrap_or_default();
        }
    }

    fn restore_pending(&mut self) {
        let recorded = &self.answers[self.current_index];
        self.pending = if recorded.is_empty() {
            None
        } else {
            Some(recorded.clone())
        };
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{QuestionDraft, SubjectId};
    use quiz_core::time::fixed_now;

    fn subject(n: usize) -> QuizSubject {
        let questions = (0..n)
            .map(|i| {
                QuestionDraft {
                    text: format!("q{i}"),
                    options: vec![
                        format!("right{i}"),
                        "w1".into(),
                        "w2".into(),
                        "w3".into(),
                    ],
                    correct_answer: format!("right{i}"),
                }
                .validate()
                .unwrap()
            })
            .collect();
        QuizSubject::new(SubjectId::new("test"), "Test", questions)
    }

    fn session(n: usize) -> QuizSession {
        QuizSession::new(subject(n), fixed_now(), 1800).unwrap()
    }

    #[test]
    fn empty_subject_is_rejected() {
        let err = QuizSession::new(subject(0), fixed_now(), 1800).unwrap_err();
        assert!(matches!(err, SessionError::EmptySubject));
    }

    #[test]
    fn answers_start_empty_and_sized_to_question_count() {
        let s = session(4);
        assert_eq!(s.answers().len(), 4);
        assert!(s.answers().iter().all(String::is_empty));
        assert_eq!(s.deadline(), fixed_now() + Duration::seconds(1800));
    }

    #[test]
    fn next_commits_pending_and_advances() {
        let mut s = session(3);
        s.select_pending("right0").unwrap();
        assert_eq!(s.next().unwrap(), StepOutcome::Advanced);
        assert_eq!(s.answers()[0], "right0");
        assert_eq!(s.current_index(), 1);
        assert_eq!(s.pending(), None);
    }

    #[test]
    fn next_without_pending_commits_empty_string() {
        let mut s = session(3);
        assert_eq!(s.next().unwrap(), StepOutcome::Advanced);
        assert_eq!(s.answers()[0], "");
    }

    #[test]
    fn previous_restores_recorded_answer_without_altering_answers() {
        let mut s = session(3);
        s.select_pending("right0").unwrap();
        s.next().unwrap();
        s.select_pending("w1").unwrap();

        s.previous().unwrap();
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.pending(), Some("right0"));
        // The uncommitted choice for question 1 is gone, its slot untouched.
        assert_eq!(s.answers()[1], "");
    }

    #[test]
    fn previous_on_first_question_is_rejected() {
        let mut s = session(3);
        let err = s.previous().unwrap_err();
        assert!(matches!(err, SessionError::NoPreviousQuestion));
    }

    #[test]
    fn advancing_onto_an_answered_question_restores_it_as_pending() {
        let mut s = session(3);
        s.select_pending("a".to_string()).unwrap();
        s.next().unwrap();
        s.select_pending("b".to_string()).unwrap();
        s.next().unwrap();
        s.previous().unwrap();
        s.previous().unwrap();

        // Walking forward again re-offers the committed answer.
        s.next().unwrap();
        assert_eq!(s.pending(), Some("b"));
    }

    #[test]
    fn next_on_last_question_finalizes() {
        let mut s = session(2);
        s.select_pending("right0").unwrap();
        s.next().unwrap();
        s.select_pending("right1").unwrap();

        let StepOutcome::Finished(attempt) = s.next().unwrap() else {
            panic!("expected finish on last question");
        };
        assert_eq!(attempt.score, 2);
        assert_eq!(attempt.total_questions, 2);
        assert!(s.is_finished());
        assert!(s.current_question().is_none());
    }

    #[test]
    fn finalize_with_no_answers_scores_zero() {
        let mut s = session(15);
        let attempt = s.finalize().unwrap();
        assert_eq!(attempt.score, 0);
        assert_eq!(attempt.total_questions, 15);
        assert_eq!(attempt.answers.len(), 15);
    }

    #[test]
    fn finalize_commits_the_pending_choice() {
        let mut s = session(2);
        s.select_pending("right0").unwrap();
        let attempt = s.finalize().unwrap();
        assert_eq!(attempt.score, 1);
        assert_eq!(attempt.answers[0], "right0");
    }

    #[test]
    fn operations_after_finish_are_rejected_without_effect() {
        let mut s = session(2);
        s.select_pending("right0").unwrap();
        let first = s.finalize().unwrap();

        assert!(matches!(s.finalize(), Err(SessionError::AlreadyFinished)));
        assert!(matches!(
            s.select_pending("x"),
            Err(SessionError::AlreadyFinished)
        ));
        assert!(matches!(s.next(), Err(SessionError::AlreadyFinished)));
        assert!(matches!(s.previous(), Err(SessionError::AlreadyFinished)));

        // State is exactly what the first finalization produced.
        assert_eq!(s.answers(), first.answers.as_slice());
    }

    #[test]
    fn progress_tracks_position_and_answered_count() {
        let mut s = session(4);
        assert_eq!(s.progress().position, 1);
        assert_eq!(s.progress().answered, 0);
        assert!((s.progress().fraction() - 0.25).abs() < f32::EPSILON);

        s.select_pending("right0").unwrap();
        s.next().unwrap();
        let progress = s.progress();
        assert_eq!(progress.position, 2);
        assert_eq!(progress.answered, 1);
        assert!(!progress.is_finished);
    }
}

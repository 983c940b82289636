use thiserror::Error;

/// Minimum number of answer options a question must offer.
pub const MIN_OPTIONS: usize = 4;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Field-scoped validation failures for a question draft.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("answer option {index} cannot be empty")]
    EmptyOption { index: usize },

    #[error("a question needs at least {MIN_OPTIONS} options, got {len}")]
    TooFewOptions { len: usize },

    #[error("the correct answer must be one of the options")]
    CorrectAnswerNotInOptions,
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated question input, as it arrives from an admin form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl QuestionDraft {
    /// Validates the draft into a `Question`.
    ///
    /// This is the only place the question invariants are enforced; persisted
    /// questions are re-hydrated without re-validation.
    ///
    /// # Errors
    ///
    /// Returns a field-scoped `QuestionError` naming the first offending
    /// field. On failure nothing is consumed besides the draft itself.
    pub fn validate(self) -> Result<Question, QuestionError> {
        if self.text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if self.options.len() < MIN_OPTIONS {
            return Err(QuestionError::TooFewOptions {
                len: self.options.len(),
            });
        }
        for (index, option) in self.options.iter().enumerate() {
            if option.trim().is_empty() {
                return Err(QuestionError::EmptyOption { index });
            }
        }
        if !self.options.contains(&self.correct_answer) {
            return Err(QuestionError::CorrectAnswerNotInOptions);
        }

        Ok(Question {
            text: self.text,
            options: self.options,
            correct_answer: self.correct_answer,
        })
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question with exactly one correct answer.
///
/// `correct_answer` is always one of `options` for questions built through
/// `QuestionDraft::validate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    options: Vec<String>,
    correct_answer: String,
}

impl Question {
    /// Re-hydrates a question from storage without re-running validation.
    ///
    /// The catalog invariant is enforced at mutation time only; whatever was
    /// persisted is trusted as-is.
    #[must_use]
    pub fn from_persisted(
        text: String,
        options: Vec<String>,
        correct_answer: String,
    ) -> Self {
        Self {
            text,
            options,
            correct_answer,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> QuestionDraft {
        QuestionDraft {
            text: "2 + 2 = ?".into(),
            options: vec!["3".into(), "4".into(), "5".into(), "6".into()],
            correct_answer: "4".into(),
        }
    }

    #[test]
    fn validate_accepts_well_formed_draft() {
        let question = draft().validate().unwrap();
        assert_eq!(question.text(), "2 + 2 = ?");
        assert_eq!(question.options().len(), 4);
        assert_eq!(question.correct_answer(), "4");
    }

    #[test]
    fn validate_rejects_empty_text() {
        let mut d = draft();
        d.text = "   ".into();
        assert_eq!(d.validate().unwrap_err(), QuestionError::EmptyText);
    }

    #[test]
    fn validate_rejects_blank_option() {
        let mut d = draft();
        d.options[2] = String::new();
        assert_eq!(
            d.validate().unwrap_err(),
            QuestionError::EmptyOption { index: 2 }
        );
    }

    #[test]
    fn validate_rejects_too_few_options() {
        let mut d = draft();
        d.options.truncate(3);
        assert_eq!(
            d.validate().unwrap_err(),
            QuestionError::TooFewOptions { len: 3 }
        );
    }

    #[test]
    fn validate_rejects_foreign_correct_answer() {
        let mut d = draft();
        d.correct_answer = "7".into();
        assert_eq!(
            d.validate().unwrap_err(),
            QuestionError::CorrectAnswerNotInOptions
        );
    }

    #[test]
    fn correct_answer_match_is_exact() {
        let mut d = draft();
        d.correct_answer = " 4".into();
        assert_eq!(
            d.validate().unwrap_err(),
            QuestionError::CorrectAnswerNotInOptions
        );
    }

    #[test]
    fn from_persisted_skips_validation() {
        let question =
            Question::from_persisted("q".into(), vec!["a".into()], "elsewhere".into());
        assert_eq!(question.correct_answer(), "elsewhere");
        assert_eq!(question.options().len(), 1);
    }
}

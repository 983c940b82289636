use crate::model::ids::SubjectId;
use crate::model::question::Question;

/// A named, ordered group of questions attempted as one quiz.
///
/// Owned by the content repository; admin mutations replace the whole
/// catalog snapshot rather than editing subjects in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSubject {
    id: SubjectId,
    name: String,
    questions: Vec<Question>,
}

impl QuizSubject {
    #[must_use]
    pub fn new(id: SubjectId, name: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            id,
            name: name.into(),
            questions,
        }
    }

    #[must_use]
    pub fn id(&self) -> &SubjectId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Appends a validated question at the end of the subject.
    pub fn push_question(&mut self, question: Question) {
        self.questions.push(question);
    }

    /// Replaces the question at `index`, keeping its position.
    ///
    /// Returns false (and leaves the subject untouched) when the index is out
    /// of bounds.
    pub fn replace_question(&mut self, index: usize, question: Question) -> bool {
        match self.questions.get_mut(index) {
            Some(slot) => {
                *slot = question;
                true
            }
            None => false,
        }
    }

    /// Removes the question at `index`, preserving the relative order of the
    /// remaining questions.
    ///
    /// Returns false when the index is out of bounds.
    pub fn remove_question(&mut self, index: usize) -> bool {
        if index < self.questions.len() {
            self.questions.remove(index);
            true
        } else {
            false
        }
    }
}

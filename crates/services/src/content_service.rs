use storage::repository::ContentOverrideRepository;
use storage::store::StoreError;

use quiz_core::model::{QuestionDraft, QuizSubject, SubjectId};

use crate::catalog::default_catalog;
use crate::error::ContentServiceError;

/// The subject/question catalog: reads prefer the admin override snapshot,
/// mutations validate and then rewrite the snapshot wholesale.
///
/// There is no merge and no locking; concurrent editors in separate sessions
/// overwrite each other and the last writer wins.
#[derive(Clone)]
pub struct ContentService {
    overrides: ContentOverrideRepository,
}

impl ContentService {
    #[must_use]
    pub fn new(overrides: ContentOverrideRepository) -> Self {
        Self { overrides }
    }

    /// The ordered subject list: the saved override if one exists, else the
    /// built-in default catalog.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be reached.
    pub async fn load(&self) -> Result<Vec<QuizSubject>, StoreError> {
        match self.overrides.load().await? {
            Some(subjects) => Ok(subjects),
            None => Ok(default_catalog()),
        }
    }

    /// Fetch one subject by id.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError::SubjectNotFound` for an unknown id.
    pub async fn subject(&self, id: &SubjectId) -> Result<QuizSubject, ContentServiceError> {
        self.load()
            .await?
            .into_iter()
            .find(|subject| subject.id() == id)
            .ok_or_else(|| ContentServiceError::SubjectNotFound(id.clone()))
    }

    /// Appends a question to a subject and rewrites the snapshot.
    ///
    /// # Errors
    ///
    /// Returns a field-scoped `QuestionError` when the draft is invalid (no
    /// mutation happens), or `SubjectNotFound` for an unknown subject.
    pub async fn add_question(
        &self,
        subject_id: &SubjectId,
        draft: QuestionDraft,
    ) -> Result<(), ContentServiceError> {
        let question = draft.validate()?;

        let mut subjects = self.load().await?;
        let subject = find_subject(&mut subjects, subject_id)?;
        subject.push_question(question);

        self.overrides.save(&subjects).await?;
        Ok(())
    }

    /// Replaces the question at `index`, keeping its position, and rewrites
    /// the snapshot.
    ///
    /// # Errors
    ///
    /// Returns a field-scoped `QuestionError` when the draft is invalid,
    /// `SubjectNotFound` for an unknown subject, or `QuestionNotFound` for
    /// an out-of-range index. Nothing is written on failure.
    pub async fn edit_question(
        &self,
        subject_id: &SubjectId,
        index: usize,
        draft: QuestionDraft,
    ) -> Result<(), ContentServiceError> {
        let question = draft.validate()?;

        let mut subjects = self.load().await?;
        let subject = find_subject(&mut subjects, subject_id)?;
        if !subject.replace_question(index, question) {
            return Err(ContentServiceError::QuestionNotFound {
                subject: subject_id.clone(),
                index,
            });
        }

        self.overrides.save(&subjects).await?;
        Ok(())
    }

    /// Deletes the question at `index`, preserving the order of the rest,
    /// and rewrites the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `SubjectNotFound` for an unknown subject or
    /// `QuestionNotFound` for an out-of-range index.
    pub async fn delete_question(
        &self,
        subject_id: &SubjectId,
        index: usize,
    ) -> Result<(), ContentServiceError> {
        let mut subjects = self.load().await?;
        let subject = find_subject(&mut subjects, subject_id)?;
        if !subject.remove_question(index) {
            return Err(ContentServiceError::QuestionNotFound {
                subject: subject_id.clone(),
                index,
            });
        }

        self.overrides.save(&subjects).await?;
        Ok(())
    }
}

fn find_subject<'a>(
    subjects: &'a mut [QuizSubject],
    id: &SubjectId,
) -> Result<&'a mut QuizSubject, ContentServiceError> {
    subjects
        .iter_mut()
        .find(|subject| subject.id() == id)
        .ok_or_else(|| ContentServiceError::SubjectNotFound(id.clone()))
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{ProfileError, QuestionError, QuizResultError, SubjectId};
use storage::store::StoreError;

/// Errors emitted by `ContentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentServiceError {
    #[error("no subject with id {0}")]
    SubjectNotFound(SubjectId),

    #[error("subject {subject} has no question at index {index}")]
    QuestionNotFound { subject: SubjectId, index: usize },

    #[error(transparent)]
    Question(#[from] QuestionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors emitted by `ProfileService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileServiceError {
    #[error("no signed-in profile")]
    NotSignedIn,

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors emitted by the quiz session controller and state machine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no subject with id {0}")]
    SubjectNotFound(SubjectId),

    #[error("subject has no questions")]
    EmptySubject,

    #[error("no signed-in profile")]
    NotSignedIn,

    #[error("session already finished")]
    AlreadyFinished,

    #[error("already at the first question")]
    NoPreviousQuestion,

    #[error("session state lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Result(#[from] QuizResultError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors emitted by `StatsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatsError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

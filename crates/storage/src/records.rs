//! Persisted wire shapes for the store's JSON payloads.
//!
//! These mirror the domain types so repositories can serialize and
//! deserialize without leaking storage concerns into the domain layer. Field
//! names are camelCase to match the payloads the key schema documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quiz_core::model::{
    Question, QuizResult, QuizResultError, QuizSubject, Role, SubjectId, UserProfile,
};

//
// ─── PROFILE ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub email: String,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub profile_image: Option<String>,
}

impl ProfileRecord {
    #[must_use]
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            email: profile.email().to_owned(),
            name: profile.name().to_owned(),
            role: profile.role().as_str().to_owned(),
            profile_image: profile.profile_image().map(str::to_owned),
        }
    }

    /// Convert the record back into a domain profile.
    ///
    /// Unknown roles decode as plain users; identity fields are taken as
    /// stored.
    #[must_use]
    pub fn into_profile(self) -> UserProfile {
        UserProfile::from_persisted(
            self.email,
            self.name,
            Role::from_wire(&self.role),
            self.profile_image,
        )
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(rename = "question")]
    pub text: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: String,
}

impl QuestionRecord {
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        Self {
            text: question.text().to_owned(),
            options: question.options().to_vec(),
            correct_answer: question.correct_answer().to_owned(),
        }
    }

    /// Re-hydrate without re-validating; the invariant was checked when the
    /// question was written.
    #[must_use]
    pub fn into_question(self) -> Question {
        Question::from_persisted(self.text, self.options, self.correct_answer)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub id: String,
    pub name: String,
    pub questions: Vec<QuestionRecord>,
}

impl SubjectRecord {
    #[must_use]
    pub fn from_subject(subject: &QuizSubject) -> Self {
        Self {
            id: subject.id().as_str().to_owned(),
            name: subject.name().to_owned(),
            questions: subject
                .questions()
                .iter()
                .map(QuestionRecord::from_question)
                .collect(),
        }
    }

    #[must_use]
    pub fn into_subject(self) -> QuizSubject {
        let questions = self
            .questions
            .into_iter()
            .map(QuestionRecord::into_question)
            .collect();
        QuizSubject::new(SubjectId::new(self.id), self.name, questions)
    }
}

//
// ─── RESULT ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub subject: String,
    pub score: u32,
    pub total_questions: u32,
    pub answers: Vec<String>,
    /// Older records carry the timestamp only in their key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ResultRecord {
    #[must_use]
    pub fn from_result(result: &QuizResult) -> Self {
        Self {
            subject: result.subject_name().to_owned(),
            score: result.score(),
            total_questions: result.total_questions(),
            answers: result.answers().to_vec(),
            created_at: Some(result.created_at()),
        }
    }

    /// Convert back into a domain result, using `key_timestamp` when the
    /// payload itself has no timestamp.
    ///
    /// # Errors
    ///
    /// Returns `QuizResultError` when the stored counts are inconsistent;
    /// callers treat that as a corrupt record and skip it.
    pub fn into_result(
        self,
        key_timestamp: DateTime<Utc>,
    ) -> Result<QuizResult, QuizResultError> {
        let created_at = self.created_at.unwrap_or(key_timestamp);
        QuizResult::new(
            self.subject,
            self.score,
            self.total_questions,
            self.answers,
            created_at,
        )
    }
}

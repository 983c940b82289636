//! The built-in default catalog.
//!
//! Served whenever no admin override snapshot exists in the store. The data
//! ships as an embedded JSON asset in the same shape the override snapshot
//! uses, so both paths decode identically.

use quiz_core::model::QuizSubject;
use storage::records::SubjectRecord;

static DEFAULT_CATALOG_JSON: &str = include_str!("../assets/default_catalog.json");

/// The default subject list: five subjects, fifteen questions each.
///
/// # Panics
///
/// Panics if the embedded asset is not valid JSON, which a compile-time
/// asset verified by tests cannot be.
#[must_use]
pub fn default_catalog() -> Vec<QuizSubject> {
    let records: Vec<SubjectRecord> = serde_json::from_str(DEFAULT_CATALOG_JSON)
        .expect("embedded default catalog should be valid JSON");
    records.into_iter().map(SubjectRecord::into_subject).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{QuestionDraft, SubjectId};

    #[test]
    fn catalog_has_five_subjects_of_fifteen_questions() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 5);
        for subject in &catalog {
            assert_eq!(subject.question_count(), 15, "{}", subject.id());
        }

        let ids: Vec<_> = catalog.iter().map(|s| s.id().clone()).collect();
        assert!(ids.contains(&SubjectId::new("algebra")));
        assert!(ids.contains(&SubjectId::new("geometriya")));
        assert!(ids.contains(&SubjectId::new("ingliz-tili")));
        assert!(ids.contains(&SubjectId::new("fizika")));
        assert!(ids.contains(&SubjectId::new("rus-tili")));
    }

    #[test]
    fn every_default_question_satisfies_the_mutation_invariants() {
        for subject in default_catalog() {
            for question in subject.questions() {
                let draft = QuestionDraft {
                    text: question.text().to_owned(),
                    options: question.options().to_vec(),
                    correct_answer: question.correct_answer().to_owned(),
                };
                draft
                    .validate()
                    .unwrap_or_else(|err| panic!("{}: {err}", subject.id()));
            }
        }
    }
}

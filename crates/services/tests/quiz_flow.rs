use std::time::Duration;

use quiz_core::model::SubjectId;
use quiz_core::time::fixed_clock;
use services::{
    ContentService, ProfileService, QuizSessionService, SessionError, StatsService,
};
use storage::repository::Stores;

struct Harness {
    stores: Stores,
    profiles: ProfileService,
    sessions: QuizSessionService,
    stats: StatsService,
}

fn harness() -> Harness {
    let stores = Stores::in_memory();
    let content = ContentService::new(stores.content.clone());
    let profiles = ProfileService::new(stores.profiles.clone(), stores.results.clone());
    let sessions = QuizSessionService::new(
        fixed_clock(),
        content,
        stores.profiles.clone(),
        stores.activity.clone(),
        stores.results.clone(),
    );
    let stats = StatsService::new(
        fixed_clock(),
        stores.profiles.clone(),
        stores.activity.clone(),
        stores.results.clone(),
    );
    Harness {
        stores,
        profiles,
        sessions,
        stats,
    }
}

fn algebra() -> SubjectId {
    SubjectId::new("algebra")
}

#[tokio::test]
async fn full_attempt_persists_result_counters_and_history() {
    let h = harness();
    h.profiles.login("aziza@b.uz", "Aziza").await.unwrap();

    let controller = h.sessions.start(&algebra()).await.unwrap();
    assert_eq!(controller.progress().unwrap().total, 15);
    assert_eq!(controller.remaining_secs(), 1800);

    // Answer the first question correctly, leave the rest blank.
    let first = controller.current_question().unwrap().unwrap();
    controller
        .select_pending(first.correct_answer().to_owned())
        .unwrap();
    assert!(controller.next().await.unwrap().is_none());
    assert_eq!(controller.progress().unwrap().position, 2);

    let result = controller.finish().await.unwrap();
    assert_eq!(result.score(), 1);
    assert_eq!(result.total_questions(), 15);
    assert_eq!(result.percentage(), 7);
    assert!(controller.is_finished().unwrap());

    // The result record, directory entry, and counters all landed.
    let history = h.profiles.history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].subject_name(), "Algebra");

    let activity = h.stats.user_activity().await.unwrap();
    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0].quizzes_taken(), 1);
    assert_eq!(activity[0].total_score(), 7);

    let stats = h.stats.recompute(&[result_subject(&h).await]).await.unwrap();
    assert_eq!(stats[&algebra()].average_score, 7);
    assert_eq!(stats[&algebra()].total_users, 1);
    assert_eq!(stats[&algebra()].active_users, 1);
}

async fn result_subject(h: &Harness) -> quiz_core::model::QuizSubject {
    ContentService::new(h.stores.content.clone())
        .subject(&algebra())
        .await
        .unwrap()
}

#[tokio::test]
async fn finishing_with_zero_answers_scores_zero() {
    let h = harness();
    h.profiles.login("aziza@b.uz", "Aziza").await.unwrap();

    let controller = h.sessions.start(&algebra()).await.unwrap();
    let result = controller.finish().await.unwrap();
    assert_eq!(result.score(), 0);
    assert_eq!(result.answers().len(), 15);
}

#[tokio::test]
async fn next_through_the_last_question_finishes_exactly_once() {
    let h = harness();
    h.profiles.login("aziza@b.uz", "Aziza").await.unwrap();

    let controller = h.sessions.start(&algebra()).await.unwrap();
    let mut persisted = None;
    for _ in 0..15 {
        let question = controller.current_question().unwrap().unwrap();
        controller
            .select_pending(question.correct_answer().to_owned())
            .unwrap();
        if let Some(result) = controller.next().await.unwrap() {
            persisted = Some(result);
        }
    }

    let result = persisted.expect("last next() finishes the attempt");
    assert_eq!(result.score(), 15);
    assert_eq!(result.percentage(), 100);

    // Post-finish operations are rejected and write nothing further.
    assert!(matches!(
        controller.finish().await,
        Err(SessionError::AlreadyFinished)
    ));
    assert!(matches!(
        controller.select_pending("x"),
        Err(SessionError::AlreadyFinished)
    ));
    assert_eq!(h.stores.results.all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn previous_rewinds_and_restores_the_recorded_answer() {
    let h = harness();
    h.profiles.login("aziza@b.uz", "Aziza").await.unwrap();

    let controller = h.sessions.start(&algebra()).await.unwrap();
    let first = controller.current_question().unwrap().unwrap();
    controller
        .select_pending(first.correct_answer().to_owned())
        .unwrap();
    controller.next().await.unwrap();

    controller.previous().unwrap();
    assert_eq!(controller.progress().unwrap().position, 1);
    assert!(matches!(
        controller.previous(),
        Err(SessionError::NoPreviousQuestion)
    ));
}

#[tokio::test]
async fn unknown_subject_is_rejected() {
    let h = harness();
    h.profiles.login("aziza@b.uz", "Aziza").await.unwrap();

    let err = h
        .sessions
        .start(&SubjectId::new("kimyo"))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::SubjectNotFound(id) if id == SubjectId::new("kimyo")));
}

#[tokio::test]
async fn starting_without_a_profile_is_rejected() {
    let h = harness();
    let err = h.sessions.start(&algebra()).await.unwrap_err();
    assert!(matches!(err, SessionError::NotSignedIn));
}

#[tokio::test]
async fn abandoned_attempt_writes_nothing() {
    let h = harness();
    h.profiles.login("aziza@b.uz", "Aziza").await.unwrap();

    let controller = h.sessions.start(&algebra()).await.unwrap();
    controller.select_pending("whatever").unwrap();
    controller.next().await.unwrap();
    drop(controller);

    assert!(h.stores.results.all().await.unwrap().is_empty());
    let activity = h.stats.user_activity().await.unwrap();
    assert!(activity.is_empty());
}

#[tokio::test(start_paused = true)]
async fn expiry_finishes_the_attempt_with_recorded_answers() {
    let h = harness();
    h.profiles.login("aziza@b.uz", "Aziza").await.unwrap();

    let controller = h.sessions.start(&algebra()).await.unwrap();
    let first = controller.current_question().unwrap().unwrap();
    controller
        .select_pending(first.correct_answer().to_owned())
        .unwrap();
    controller.next().await.unwrap();

    // Run the clock past the 1800-second budget; the expiry path finishes
    // and persists on its own.
    tokio::time::sleep(Duration::from_secs(1801)).await;
    let mut results = h.stores.results.all().await.unwrap();
    for _ in 0..100 {
        if !results.is_empty() {
            break;
        }
        tokio::task::yield_now().await;
        results = h.stores.results.all().await.unwrap();
    }

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score(), 1);
    assert!(controller.is_finished().unwrap());
    assert_eq!(controller.remaining_secs(), 0);

    // A user finish arriving after expiry is an idempotent rejection.
    assert!(matches!(
        controller.finish().await,
        Err(SessionError::AlreadyFinished)
    ));
    assert_eq!(h.stores.results.all().await.unwrap().len(), 1);
}

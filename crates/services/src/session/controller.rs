use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::warn;

use quiz_core::Clock;
use quiz_core::model::{Question, QuizResult, SubjectId, UserProfile};
use storage::repository::{ActivityRepository, ProfileRepository, ResultRepository};

use super::progress::SessionProgress;
use super::state::{FinishedAttempt, QuizSession, StepOutcome};
use super::timer::{SessionClock, TimerHandle};
use crate::content_service::ContentService;
use crate::error::SessionError;

/// Fixed time budget per attempt, in seconds. Not configurable per subject.
pub const SESSION_BUDGET_SECS: u64 = 1800;

//
// ─── PERSISTENCE SINK ──────────────────────────────────────────────────────────
//

/// Everything a finalized attempt writes: the immutable result record, the
/// user's directory entry, and the activity counters.
#[derive(Clone)]
struct AttemptSink {
    profiles: ProfileRepository,
    activity: ActivityRepository,
    results: ResultRepository,
    clock: Clock,
}

impl AttemptSink {
    async fn persist(
        &self,
        user: &UserProfile,
        attempt: FinishedAttempt,
    ) -> Result<QuizResult, SessionError> {
        let now = self.clock.now();
        let result = QuizResult::new(
            attempt.subject_name,
            attempt.score,
            attempt.total_questions,
            attempt.answers,
            now,
        )?;

        self.results.append(user.email(), &result).await?;
        self.profiles.upsert_directory_entry(user).await?;
        self.activity
            .record_attempt(user.email(), result.percentage(), now)
            .await?;
        Ok(result)
    }
}

fn lock(session: &Mutex<QuizSession>) -> Result<MutexGuard<'_, QuizSession>, SessionError> {
    session.lock().map_err(|_| SessionError::LockPoisoned)
}

async fn finalize_and_persist(
    session: &Mutex<QuizSession>,
    user: &UserProfile,
    sink: &AttemptSink,
) -> Result<QuizResult, SessionError> {
    // The Finished guard inside finalize makes this safe to reach from both
    // the user and the expiry path; only the first caller gets the attempt.
    let attempt = lock(session)?.finalize()?;
    sink.persist(user, attempt).await
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Starts quiz attempts for the signed-in user.
#[derive(Clone)]
pub struct QuizSessionService {
    content: ContentService,
    sink: AttemptSink,
}

impl QuizSessionService {
    #[must_use]
    pub fn new(
        clock: Clock,
        content: ContentService,
        profiles: ProfileRepository,
        activity: ActivityRepository,
        results: ResultRepository,
    ) -> Self {
        Self {
            content,
            sink: AttemptSink {
                profiles,
                activity,
                results,
                clock,
            },
        }
    }

    /// Starts an attempt at the given subject and begins the countdown.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn` without a session profile, `SubjectNotFound`
    /// when the catalog has no such subject, `EmptySubject` when it has no
    /// questions, or `Store` errors from the catalog read.
    pub async fn start(
        &self,
        subject_id: &SubjectId,
    ) -> Result<QuizSessionController, SessionError> {
        let user = self
            .sink
            .profiles
            .current()
            .await?
            .ok_or(SessionError::NotSignedIn)?;

        let subject = self
            .content
            .load()
            .await?
            .into_iter()
            .find(|subject| subject.id() == subject_id)
            .ok_or_else(|| SessionError::SubjectNotFound(subject_id.clone()))?;

        let now = self.sink.clock.now();
        let session = Arc::new(Mutex::new(QuizSession::new(
            subject,
            now,
            SESSION_BUDGET_SECS,
        )?));

        let remaining_secs = Arc::new(AtomicU64::new(SESSION_BUDGET_SECS));
        let on_tick = {
            let remaining = Arc::clone(&remaining_secs);
            move |secs| remaining.store(secs, Ordering::SeqCst)
        };
        let on_expire = {
            let session = Arc::clone(&session);
            let sink = self.sink.clone();
            let user = user.clone();
            move || {
                tokio::spawn(async move {
                    match finalize_and_persist(&session, &user, &sink).await {
                        // The user finished first; nothing left to do.
                        Ok(_) | Err(SessionError::AlreadyFinished) => {}
                        Err(err) => warn!(%err, "failed to persist expired attempt"),
                    }
                });
            }
        };
        let timer = SessionClock::start(SESSION_BUDGET_SECS, on_tick, on_expire);

        Ok(QuizSessionController {
            session,
            user,
            timer,
            remaining_secs,
            sink: self.sink.clone(),
        })
    }
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// One running attempt: the state machine, its countdown, and the signed-in
/// user it belongs to.
///
/// Dropping the controller mid-attempt stops the countdown and persists
/// nothing; abandoned attempts leave no trace in the store.
pub struct QuizSessionController {
    session: Arc<Mutex<QuizSession>>,
    user: UserProfile,
    timer: TimerHandle,
    remaining_secs: Arc<AtomicU64>,
    sink: AttemptSink,
}

impl QuizSessionController {
    #[must_use]
    pub fn user(&self) -> &UserProfile {
        &self.user
    }

    /// Records a not-yet-committed choice for the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyFinished` after the attempt ended.
    pub fn select_pending(&self, option: impl Into<String>) -> Result<(), SessionError> {
        lock(&self.session)?.select_pending(option)
    }

    /// Commits the pending choice and advances. On the last question this
    /// finishes the attempt and returns the persisted result.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyFinished` after the attempt ended, or
    /// persistence errors when this step finished it.
    pub async fn next(&self) -> Result<Option<QuizResult>, SessionError> {
        let outcome = lock(&self.session)?.next()?;
        match outcome {
            StepOutcome::Advanced => Ok(None),
            StepOutcome::Finished(attempt) => {
                self.timer.stop();
                let result = self.sink.persist(&self.user, attempt).await?;
                Ok(Some(result))
            }
        }
    }

    /// Moves back one question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoPreviousQuestion` on the first question and
    /// `SessionError::AlreadyFinished` after the attempt ended.
    pub fn previous(&self) -> Result<(), SessionError> {
        lock(&self.session)?.previous()
    }

    /// Finishes the attempt: stops the countdown, scores whatever answers
    /// are recorded, and persists the result and counters.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyFinished` when the attempt already
    /// ended (including via expiry); nothing is written twice.
    pub async fn finish(&self) -> Result<QuizResult, SessionError> {
        let attempt = lock(&self.session)?.finalize()?;
        self.timer.stop();
        self.sink.persist(&self.user, attempt).await
    }

    /// The question currently shown, or `None` once finished.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::LockPoisoned` if the state lock is poisoned.
    pub fn current_question(&self) -> Result<Option<Question>, SessionError> {
        Ok(lock(&self.session)?.current_question().cloned())
    }

    /// Progress through the question list.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::LockPoisoned` if the state lock is poisoned.
    pub fn progress(&self) -> Result<SessionProgress, SessionError> {
        Ok(lock(&self.session)?.progress())
    }

    /// Whether the attempt reached its terminal state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::LockPoisoned` if the state lock is poisoned.
    pub fn is_finished(&self) -> Result<bool, SessionError> {
        Ok(lock(&self.session)?.is_finished())
    }

    /// Remaining whole seconds, as last reported by the countdown.
    #[must_use]
    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for QuizSessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizSessionController")
            .field("user", &self.user.email())
            .field("remaining_secs", &self.remaining_secs())
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}

use chrono::{DateTime, Utc};

/// How many whole days a user may be idle and still count as active.
pub const ACTIVE_WINDOW_DAYS: i64 = 7;

/// Per-user activity counters, assembled from the store's directory entries.
///
/// `total_score` is the running sum of attempt percentages; the average is
/// always derived, never stored. Counters are updated with unsynchronized
/// read-modify-write cycles, so concurrent sessions can overwrite each
/// other (last write wins).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserActivityRecord {
    email: String,
    name: String,
    last_active_at: DateTime<Utc>,
    quizzes_taken: u32,
    total_score: u64,
}

impl UserActivityRecord {
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        last_active_at: DateTime<Utc>,
        quizzes_taken: u32,
        total_score: u64,
    ) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            last_active_at,
            quizzes_taken,
            total_score,
        }
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn last_active_at(&self) -> DateTime<Utc> {
        self.last_active_at
    }

    #[must_use]
    pub fn quizzes_taken(&self) -> u32 {
        self.quizzes_taken
    }

    #[must_use]
    pub fn total_score(&self) -> u64 {
        self.total_score
    }

    /// Average attempt percentage, rounded; 0 before the first attempt.
    #[must_use]
    pub fn average_score(&self) -> u32 {
        if self.quizzes_taken == 0 {
            return 0;
        }
        let avg = self.total_score as f64 / f64::from(self.quizzes_taken);
        avg.round() as u32
    }

    /// Folds one completed attempt into the counters.
    pub fn record_attempt(&mut self, percentage: u32, now: DateTime<Utc>) {
        self.quizzes_taken = self.quizzes_taken.saturating_add(1);
        self.total_score = self.total_score.saturating_add(u64::from(percentage));
        self.last_active_at = now;
    }

    /// Whether the user counts as active at `now`.
    ///
    /// The window uses whole-day truncation: elapsed hours divided by 24,
    /// floored, compared against the window. Exactly seven days is already
    /// inactive.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        let elapsed_days = (now - self.last_active_at).num_hours() / 24;
        elapsed_days < ACTIVE_WINDOW_DAYS
    }
}

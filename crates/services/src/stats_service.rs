use std::collections::{BTreeMap, HashMap};

use quiz_core::Clock;
use quiz_core::model::stats::FALLBACK_AVERAGE_SCORE;
use quiz_core::model::{AggregateStats, QuizSubject, SubjectId, UserActivityRecord};
use storage::repository::{ActivityRepository, ProfileRepository, ResultRepository};

use crate::error::StatsError;

/// Recomputes dashboard figures from raw result and activity records.
///
/// Every call is a fresh full scan of the store; nothing is cached or
/// incrementally maintained. With many users this is O(total keys) per
/// computation — a secondary index would fix it, but correctness does not
/// require one.
#[derive(Clone)]
pub struct StatsService {
    profiles: ProfileRepository,
    activity: ActivityRepository,
    results: ResultRepository,
    clock: Clock,
}

impl StatsService {
    #[must_use]
    pub fn new(
        clock: Clock,
        profiles: ProfileRepository,
        activity: ActivityRepository,
        results: ResultRepository,
    ) -> Self {
        Self {
            profiles,
            activity,
            results,
            clock,
        }
    }

    /// Per-subject aggregate figures for the given catalog.
    ///
    /// Result records are matched to subjects by name; each becomes a
    /// percentage, and their rounded average falls back to a constant 70
    /// for subjects nobody has attempted. User counts come from the
    /// directory prefix scan and are the same for every subject.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Store` if the store cannot be reached.
    pub async fn recompute(
        &self,
        subjects: &[QuizSubject],
    ) -> Result<BTreeMap<SubjectId, AggregateStats>, StatsError> {
        let now = self.clock.now();

        let mut percentages: HashMap<String, Vec<u32>> = HashMap::new();
        for result in self.results.all().await? {
            percentages
                .entry(result.subject_name().to_owned())
                .or_default()
                .push(result.percentage());
        }

        let users = self.user_activity().await?;
        let total_users = users.len();
        let active_users = users.iter().filter(|user| user.is_active_at(now)).count();

        let mut stats = BTreeMap::new();
        for subject in subjects {
            let average_score = match percentages.get(subject.name()) {
                Some(scores) if !scores.is_empty() => {
                    let sum: u64 = scores.iter().copied().map(u64::from).sum();
                    let avg = sum as f64 / scores.len() as f64;
                    avg.round() as u32
                }
                _ => FALLBACK_AVERAGE_SCORE,
            };

            stats.insert(
                subject.id().clone(),
                AggregateStats {
                    total_questions: subject.question_count(),
                    total_users,
                    average_score,
                    active_users,
                },
            );
        }

        Ok(stats)
    }

    /// Activity records for every known user, most recently active first.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Store` if the store cannot be reached.
    pub async fn user_activity(&self) -> Result<Vec<UserActivityRecord>, StatsError> {
        let now = self.clock.now();
        let mut records = Vec::new();
        for profile in self.profiles.list_directory().await? {
            records.push(
                self.activity
                    .for_user(profile.email(), profile.name(), now)
                    .await?,
            );
        }
        records.sort_by(|a, b| b.last_active_at().cmp(&a.last_active_at()));
        Ok(records)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, SecondsFormat};
    use quiz_core::model::{QuizResult, Role, UserProfile};
    use quiz_core::time::{fixed_clock, fixed_now};
    use storage::keys;
    use storage::repository::Stores;

    fn service(stores: &Stores) -> StatsService {
        StatsService::new(
            fixed_clock(),
            stores.profiles.clone(),
            stores.activity.clone(),
            stores.results.clone(),
        )
    }

    fn catalog() -> Vec<QuizSubject> {
        crate::catalog::default_catalog()
    }

    async fn add_user(stores: &Stores, email: &str, name: &str, last_active_ago: Duration) {
        let profile = UserProfile::new(email, name, Role::User, None).unwrap();
        stores.profiles.upsert_directory_entry(&profile).await.unwrap();
        let at = fixed_now() - last_active_ago;
        stores
            .raw()
            .set(
                &keys::last_active(email),
                &at.to_rfc3339_opts(SecondsFormat::Millis, true),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn subjects_without_results_fall_back_to_seventy() {
        let stores = Stores::in_memory();
        let stats = service(&stores).recompute(&catalog()).await.unwrap();

        let algebra = &stats[&SubjectId::new("algebra")];
        assert_eq!(algebra.average_score, 70);
        assert_eq!(algebra.total_questions, 15);
        assert_eq!(algebra.total_users, 0);
        assert_eq!(algebra.active_users, 0);
    }

    #[tokio::test]
    async fn averages_are_per_subject_and_rounded() {
        let stores = Stores::in_memory();
        let now = fixed_now();

        // Algebra: 3/15 → 20% and 7/15 → 47%, average 33.5 → 34.
        let first = QuizResult::new("Algebra", 3, 15, vec![String::new(); 15], now).unwrap();
        stores.results.append("a@b.uz", &first).await.unwrap();
        let second = QuizResult::new(
            "Algebra",
            7,
            15,
            vec![String::new(); 15],
            now + Duration::minutes(1),
        )
        .unwrap();
        stores.results.append("c@d.uz", &second).await.unwrap();

        let stats = service(&stores).recompute(&catalog()).await.unwrap();
        assert_eq!(stats[&SubjectId::new("algebra")].average_score, 34);
        // Untouched subjects keep the fallback.
        assert_eq!(stats[&SubjectId::new("fizika")].average_score, 70);
    }

    #[tokio::test]
    async fn active_window_is_seven_whole_days() {
        let stores = Stores::in_memory();
        add_user(&stores, "fresh@b.uz", "Fresh", Duration::days(6)).await;
        add_user(
            &stores,
            "stale@b.uz",
            "Stale",
            Duration::days(7) + Duration::seconds(1),
        )
        .await;

        let stats = service(&stores).recompute(&catalog()).await.unwrap();
        let algebra = &stats[&SubjectId::new("algebra")];
        assert_eq!(algebra.total_users, 2);
        assert_eq!(algebra.active_users, 1);
    }

    #[tokio::test]
    async fn corrupt_result_records_are_skipped_not_fatal() {
        let stores = Stores::in_memory();
        let now = fixed_now();

        let good = QuizResult::new("Algebra", 15, 15, vec![String::new(); 15], now).unwrap();
        stores.results.append("a@b.uz", &good).await.unwrap();
        stores
            .raw()
            .set(
                &keys::quiz_result("a@b.uz", now + Duration::minutes(1)),
                "{definitely not json",
            )
            .await
            .unwrap();

        let stats = service(&stores).recompute(&catalog()).await.unwrap();
        // Only the intact 100% record contributes.
        assert_eq!(stats[&SubjectId::new("algebra")].average_score, 100);
    }

    #[tokio::test]
    async fn user_activity_is_sorted_most_recent_first() {
        let stores = Stores::in_memory();
        add_user(&stores, "old@b.uz", "Old", Duration::days(3)).await;
        add_user(&stores, "new@b.uz", "New", Duration::hours(1)).await;

        let records = service(&stores).user_activity().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].email(), "new@b.uz");
        assert_eq!(records[1].email(), "old@b.uz");
    }
}

//! Typed repositories over the flat key-value store.
//!
//! The store itself is schema-less; these adapters impose the application's
//! logical tables (profiles, activity counters, results, content override)
//! and keep every key string behind [`crate::keys`]. Corrupt payloads are
//! logged and skipped at the point of read, never surfaced to callers.
//! Counter updates are unsynchronized read-modify-write cycles: independent
//! sessions race with last-write-wins semantics, which is accepted.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use tracing::warn;

use quiz_core::model::{QuizResult, QuizSubject, UserActivityRecord, UserProfile};

use crate::keys;
use crate::records::{ProfileRecord, ResultRecord, SubjectRecord};
use crate::store::{InMemoryStore, KeyValueStore, StoreError};

fn decode_json<T: DeserializeOwned>(key: &str, raw: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, %err, "skipping corrupt record");
            None
        }
    }
}

fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|err| StoreError::Serialization(err.to_string()))
}

//
// ─── PROFILES ──────────────────────────────────────────────────────────────────
//

/// The active session profile plus the per-user directory entries that stand
/// in for a user table.
#[derive(Clone)]
pub struct ProfileRepository {
    store: Arc<dyn KeyValueStore>,
}

impl ProfileRepository {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The profile of the signed-in user, re-derived from the store.
    ///
    /// A corrupt or identity-less payload reads as "not signed in".
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be reached.
    pub async fn current(&self) -> Result<Option<UserProfile>, StoreError> {
        let Some(raw) = self.store.get(keys::SESSION_USER).await? else {
            return Ok(None);
        };
        let Some(record) = decode_json::<ProfileRecord>(keys::SESSION_USER, &raw) else {
            return Ok(None);
        };
        if record.email.is_empty() {
            warn!("session profile has no email, treating as signed out");
            return Ok(None);
        }
        Ok(Some(record.into_profile()))
    }

    /// Stores `profile` as the active session profile.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be reached.
    pub async fn set_current(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let payload = encode_json(&ProfileRecord::from_profile(profile))?;
        self.store.set(keys::SESSION_USER, &payload).await
    }

    /// Signs the session out.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be reached.
    pub async fn clear_current(&self) -> Result<(), StoreError> {
        self.store.remove(keys::SESSION_USER).await
    }

    /// Writes the user's directory entry, making them discoverable by the
    /// prefix scan.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be reached.
    pub async fn upsert_directory_entry(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let payload = encode_json(&ProfileRecord::from_profile(profile))?;
        self.store
            .set(&keys::user_entry(profile.email()), &payload)
            .await
    }

    /// Every known user, discovered via the directory prefix scan. Corrupt
    /// entries are skipped.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be reached.
    pub async fn list_directory(&self) -> Result<Vec<UserProfile>, StoreError> {
        let mut profiles = Vec::new();
        for key in self.store.keys_with_prefix(keys::USER_PREFIX).await? {
            let Some(raw) = self.store.get(&key).await? else {
                continue;
            };
            if let Some(record) = decode_json::<ProfileRecord>(&key, &raw) {
                profiles.push(record.into_profile());
            }
        }
        Ok(profiles)
    }
}

//
// ─── ACTIVITY COUNTERS ─────────────────────────────────────────────────────────
//

/// Scalar per-user counters: last-active marker, attempt count, cumulative
/// percentage sum.
#[derive(Clone)]
pub struct ActivityRepository {
    store: Arc<dyn KeyValueStore>,
}

impl ActivityRepository {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn read_counter(&self, key: &str) -> Result<u64, StoreError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(0);
        };
        match raw.trim().parse() {
            Ok(value) => Ok(value),
            Err(_) => {
                warn!(key, %raw, "unreadable counter, treating as 0");
                Ok(0)
            }
        }
    }

    /// Folds one completed attempt into the user's counters and moves the
    /// last-active marker to `now`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be reached.
    pub async fn record_attempt(
        &self,
        email: &str,
        percentage: u32,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let taken = self.read_counter(&keys::quizzes_taken(email)).await? + 1;
        let score = self.read_counter(&keys::total_score(email)).await? + u64::from(percentage);

        self.store
            .set(&keys::quizzes_taken(email), &taken.to_string())
            .await?;
        self.store
            .set(&keys::total_score(email), &score.to_string())
            .await?;
        self.store
            .set(
                &keys::last_active(email),
                &now.to_rfc3339_opts(SecondsFormat::Millis, true),
            )
            .await
    }

    /// Assembles the activity record for one user.
    ///
    /// Counters that are absent or unreadable count as zero; an absent or
    /// unreadable last-active marker falls back to `now`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be reached.
    pub async fn for_user(
        &self,
        email: &str,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<UserActivityRecord, StoreError> {
        let quizzes_taken = self.read_counter(&keys::quizzes_taken(email)).await?;
        let total_score = self.read_counter(&keys::total_score(email)).await?;

        let last_active = match self.store.get(&keys::last_active(email)).await? {
            Some(raw) => match DateTime::parse_from_rfc3339(raw.trim()) {
                Ok(parsed) => parsed.with_timezone(&Utc),
                Err(err) => {
                    warn!(email, %raw, %err, "unreadable last-active marker");
                    now
                }
            },
            None => now,
        };

        Ok(UserActivityRecord::new(
            email,
            name,
            last_active,
            u32::try_from(quizzes_taken).unwrap_or(u32::MAX),
            total_score,
        ))
    }
}

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

/// Immutable attempt records, one per completed attempt.
#[derive(Clone)]
pub struct ResultRepository {
    store: Arc<dyn KeyValueStore>,
}

impl ResultRepository {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Appends a result under the per-user per-timestamp key and returns
    /// that key. Results are never updated or deleted afterwards.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be reached.
    pub async fn append(&self, email: &str, result: &QuizResult) -> Result<String, StoreError> {
        let key = keys::quiz_result(email, result.created_at());
        let payload = encode_json(&ResultRecord::from_result(result))?;
        self.store.set(&key, &payload).await?;
        Ok(key)
    }

    async fn collect(&self, prefix: &str) -> Result<Vec<QuizResult>, StoreError> {
        let mut results = Vec::new();
        for key in self.store.keys_with_prefix(prefix).await? {
            let Some(raw) = self.store.get(&key).await? else {
                continue;
            };
            let Some(record) = decode_json::<ResultRecord>(&key, &raw) else {
                continue;
            };
            let key_timestamp = keys::result_timestamp(&key).unwrap_or_default();
            match record.into_result(key_timestamp) {
                Ok(result) => results.push(result),
                Err(err) => warn!(key, %err, "skipping inconsistent result record"),
            }
        }
        Ok(results)
    }

    /// One user's attempt history, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be reached.
    pub async fn history(&self, email: &str) -> Result<Vec<QuizResult>, StoreError> {
        let mut results = self.collect(&keys::user_result_prefix(email)).await?;
        results.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(results)
    }

    /// Every stored attempt record, across all users. A full scan.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be reached.
    pub async fn all(&self) -> Result<Vec<QuizResult>, StoreError> {
        self.collect(keys::RESULT_PREFIX).await
    }
}

//
// ─── CONTENT OVERRIDE ──────────────────────────────────────────────────────────
//

/// The admin-edited catalog snapshot superseding the built-in default.
#[derive(Clone)]
pub struct ContentOverrideRepository {
    store: Arc<dyn KeyValueStore>,
}

impl ContentOverrideRepository {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The override snapshot, if one was ever saved. A corrupt snapshot
    /// reads as absent so consumers fall back to the default catalog.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be reached.
    pub async fn load(&self) -> Result<Option<Vec<QuizSubject>>, StoreError> {
        let Some(raw) = self.store.get(keys::CONTENT_OVERRIDE).await? else {
            return Ok(None);
        };
        let Some(records) = decode_json::<Vec<SubjectRecord>>(keys::CONTENT_OVERRIDE, &raw)
        else {
            return Ok(None);
        };
        Ok(Some(
            records.into_iter().map(SubjectRecord::into_subject).collect(),
        ))
    }

    /// Replaces the whole snapshot. Concurrent editors overwrite each other;
    /// last writer wins.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be reached.
    pub async fn save(&self, subjects: &[QuizSubject]) -> Result<(), StoreError> {
        let records: Vec<SubjectRecord> =
            subjects.iter().map(SubjectRecord::from_subject).collect();
        let payload = encode_json(&records)?;
        self.store.set(keys::CONTENT_OVERRIDE, &payload).await
    }
}

//
// ─── AGGREGATE ─────────────────────────────────────────────────────────────────
//

/// All typed repositories over one shared store, for easy wiring.
#[derive(Clone)]
pub struct Stores {
    pub profiles: ProfileRepository,
    pub activity: ActivityRepository,
    pub results: ResultRepository,
    pub content: ContentOverrideRepository,
    store: Arc<dyn KeyValueStore>,
    degraded: bool,
}

impl Stores {
    /// Builds the repository set over an existing store handle.
    #[must_use]
    pub fn from_store(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            profiles: ProfileRepository::new(store.clone()),
            activity: ActivityRepository::new(store.clone()),
            results: ResultRepository::new(store.clone()),
            content: ContentOverrideRepository::new(store.clone()),
            store,
            degraded: false,
        }
    }

    /// Repository set over a process-local map; contents die with the
    /// process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryStore::new()))
    }

    pub(crate) fn degraded(mut self) -> Self {
        self.degraded = true;
        self
    }

    /// True when the durable backend was unavailable and this set silently
    /// runs on in-memory storage; callers must tell the user that work will
    /// be lost.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// The underlying flat store.
    #[must_use]
    pub fn raw(&self) -> Arc<dyn KeyValueStore> {
        self.store.clone()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

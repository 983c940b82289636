//! The store's key schema, kept in one place so the encoding can be swapped
//! without touching the repositories.
//!
//! | key                                   | value                          |
//! |---------------------------------------|--------------------------------|
//! | `quizUser`                            | JSON profile (active session)  |
//! | `quizUser_{email}`                    | JSON profile (directory entry) |
//! | `lastActive_{email}`                  | RFC3339 timestamp              |
//! | `quizzesTaken_{email}`                | integer string                 |
//! | `totalScore_{email}`                  | integer string                 |
//! | `quizResult_{email}_{timestampMillis}`| JSON result, immutable         |
//! | `adminQuizData`                       | JSON subject list (override)   |

use chrono::{DateTime, Utc};

/// The active session's profile.
pub const SESSION_USER: &str = "quizUser";

/// The admin-edited catalog snapshot that supersedes the built-in default.
pub const CONTENT_OVERRIDE: &str = "adminQuizData";

/// Prefix under which one directory entry per known user lives.
pub const USER_PREFIX: &str = "quizUser_";

/// Prefix under which all attempt records live.
pub const RESULT_PREFIX: &str = "quizResult_";

#[must_use]
pub fn user_entry(email: &str) -> String {
    format!("{USER_PREFIX}{email}")
}

#[must_use]
pub fn last_active(email: &str) -> String {
    format!("lastActive_{email}")
}

#[must_use]
pub fn quizzes_taken(email: &str) -> String {
    format!("quizzesTaken_{email}")
}

#[must_use]
pub fn total_score(email: &str) -> String {
    format!("totalScore_{email}")
}

/// Key for one attempt record, unique per user and millisecond.
#[must_use]
pub fn quiz_result(email: &str, at: DateTime<Utc>) -> String {
    format!("{RESULT_PREFIX}{email}_{}", at.timestamp_millis())
}

/// Prefix matching every attempt record of one user.
#[must_use]
pub fn user_result_prefix(email: &str) -> String {
    format!("{RESULT_PREFIX}{email}_")
}

/// Recovers the attempt timestamp encoded in a result key.
///
/// Emails may themselves contain underscores, so the timestamp is taken from
/// the last segment.
#[must_use]
pub fn result_timestamp(key: &str) -> Option<DateTime<Utc>> {
    let (_, millis) = key.strip_prefix(RESULT_PREFIX)?.rsplit_once('_')?;
    let millis: i64 = millis.parse().ok()?;
    DateTime::<Utc>::from_timestamp_millis(millis)
}

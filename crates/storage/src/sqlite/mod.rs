use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{Row, SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;
use tracing::warn;

use crate::repository::Stores;
use crate::store::{KeyValueStore, StoreError};

mod migrate;

/// `SQLite`-backed key-value store: one `kv` table, no schema beyond it.
///
/// `SQLite` plays the role of the durable host here the way browser storage
/// does for a web client: local, serverless, shared by every session on the
/// machine, with no transactions spanning application operations.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl SqliteStore {
    /// Connect to `SQLite` using the given URL.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the connection cannot be established or
    /// the setup pragmas fail.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA journal_mode = WAL;")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("PRAGMA busy_timeout = 5000;")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the `kv` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if migration queries fail.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

/// Escapes `LIKE` metacharacters so a key prefix matches literally.
///
/// Every key in the schema contains underscores, which `LIKE` would
/// otherwise treat as a single-character wildcard.
fn like_prefix(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len() + 1);
    for ch in prefix.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT value FROM kv WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        row.try_get("value")
            .map(Some)
            .map_err(|err| StoreError::Unavailable(err.to_string()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO kv (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            ",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM kv WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query(
            r"
            SELECT key FROM kv
            WHERE key LIKE ?1 ESCAPE '\'
            ORDER BY key
            ",
        )
        .bind(like_prefix(prefix))
        .fetch_all(&self.pool)
        .await
        .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        rows.into_iter()
            .map(|row| {
                row.try_get("key")
                    .map_err(|err| StoreError::Unavailable(err.to_string()))
            })
            .collect()
    }
}

impl Stores {
    /// Build the repository set backed by `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connection or migrations cannot be
    /// completed.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let store = SqliteStore::connect(database_url).await?;
        store.migrate().await?;
        Ok(Self::from_store(Arc::new(store)))
    }

    /// Build the repository set backed by `SQLite`, degrading to in-memory
    /// storage when the durable backend is unavailable.
    ///
    /// The degraded set keeps every operation working for the rest of the
    /// session, but nothing survives a restart; check
    /// [`Stores::is_degraded`] and tell the user.
    pub async fn open(database_url: &str) -> Self {
        match Self::sqlite(database_url).await {
            Ok(stores) => stores,
            Err(err) => {
                warn!(%err, database_url, "durable store unavailable, continuing in memory");
                Self::in_memory().degraded()
            }
        }
    }
}

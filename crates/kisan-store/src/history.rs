//! The per-user history contract and its SQLite implementation.
//!
//! Both the live conversation session and the history review consume
//! [`HistoryStore`]; the trait is the seam that lets tests substitute an
//! in-memory double and keeps the session free of SQL.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use kisan_core::error::KisanError;
use kisan_core::types::{Role, StoredTurn, StoredTurnId, UserId};

use crate::db::Database;

/// Append-only, per-user chat log.
///
/// All operations are scoped to a single user; the store never mixes two
/// users' turns in one logical log. Appends are durable and ordered by the
/// store's own creation time, not the caller's clock.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Durably record one turn. The store assigns the id and creation time.
    async fn append(
        &self,
        user_id: &UserId,
        role: Role,
        text: &str,
    ) -> Result<StoredTurn, KisanError>;

    /// Return at most `limit` most-recently-created turns, newest first.
    async fn fetch_recent(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<StoredTurn>, KisanError>;

    /// Delete every turn for the user, returning the number removed.
    ///
    /// Best-effort bulk delete: a turn appended concurrently with the clear
    /// may or may not survive.
    async fn clear_all(&self, user_id: &UserId) -> Result<u64, KisanError>;
}

/// SQLite-backed [`HistoryStore`].
pub struct SqliteHistory {
    db: Arc<Database>,
}

impl SqliteHistory {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HistoryStore for SqliteHistory {
    async fn append(
        &self,
        user_id: &UserId,
        role: Role,
        text: &str,
    ) -> Result<StoredTurn, KisanError> {
        let created_at_ms = Utc::now().timestamp_millis();
        let (id, created_at) = self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO chat_history (user_id, role, text, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![user_id.as_str(), role.as_str(), text, created_at_ms],
            )
            .map_err(|e| KisanError::Storage(format!("Failed to append turn: {}", e)))?;
            Ok((conn.last_insert_rowid(), created_at_ms))
        })?;

        Ok(StoredTurn {
            id: StoredTurnId(id),
            user_id: user_id.clone(),
            role,
            text: text.to_string(),
            created_at: millis_to_datetime(created_at)?,
        })
    }

    async fn fetch_recent(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<StoredTurn>, KisanError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, user_id, role, text, created_at
                     FROM chat_history
                     WHERE user_id = ?1
                     ORDER BY created_at DESC, id DESC
                     LIMIT ?2",
                )
                .map_err(|e| KisanError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![user_id.as_str(), limit as i64], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                })
                .map_err(|e| KisanError::Storage(e.to_string()))?;

            let mut turns = Vec::new();
            for row in rows {
                let (id, uid, role, text, created_at) =
                    row.map_err(|e| KisanError::Storage(e.to_string()))?;
                turns.push(StoredTurn {
                    id: StoredTurnId(id),
                    user_id: UserId::new(uid),
                    role: Role::parse(&role).ok_or_else(|| {
                        KisanError::Storage(format!("Unknown role in chat log: {}", role))
                    })?,
                    text,
                    created_at: millis_to_datetime(created_at)?,
                });
            }
            Ok(turns)
        })
    }

    async fn clear_all(&self, user_id: &UserId) -> Result<u64, KisanError> {
        self.db.with_conn(|conn| {
            let removed = conn
                .execute(
                    "DELETE FROM chat_history WHERE user_id = ?1",
                    rusqlite::params![user_id.as_str()],
                )
                .map_err(|e| KisanError::Storage(format!("Failed to clear history: {}", e)))?;
            Ok(removed as u64)
        })
    }
}

/// Look up a single turn by store id. Test and diagnostic helper.
pub fn find_by_id(db: &Database, id: StoredTurnId) -> Result<Option<StoredTurn>, KisanError> {
    db.with_conn(|conn| {
        let row = conn
            .query_row(
                "SELECT id, user_id, role, text, created_at
                 FROM chat_history WHERE id = ?1",
                rusqlite::params![id.0],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| KisanError::Storage(e.to_string()))?;

        match row {
            Some((id, uid, role, text, created_at)) => Ok(Some(StoredTurn {
                id: StoredTurnId(id),
                user_id: UserId::new(uid),
                role: Role::parse(&role)
                    .ok_or_else(|| KisanError::Storage(format!("Unknown role: {}", role)))?,
                text,
                created_at: millis_to_datetime(created_at)?,
            })),
            None => Ok(None),
        }
    })
}

fn millis_to_datetime(ms: i64) -> Result<DateTime<Utc>, KisanError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| KisanError::Storage(format!("Invalid creation time: {}", ms)))
}

// =============================================================================
// Tests
// =============================================================================

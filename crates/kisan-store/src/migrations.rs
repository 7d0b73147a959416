//! Database schema migrations.
//!
//! Applies the chat_history schema and the schema_migrations tracking table.

use rusqlite::Connection;
use tracing::info;

use kisan_core::error::KisanError;

/// Run all pending database migrations.
///
/// Currently implements the initial schema (version 1). Future migrations
/// can be added by checking the current version and applying incremental
/// changes.
pub fn run_migrations(conn: &Connection) -> Result<(), KisanError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| KisanError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| KisanError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: chat_history");
    }

    Ok(())
}

/// Version 1: the per-user append-only chat log.
fn apply_v1(conn: &Connection) -> Result<(), KisanError> {
    conn.execute_batch(
        "
        -- One row per persisted turn. The store assigns id and created_at;
        -- retrieval orders by (created_at, id) so same-millisecond appends
        -- keep their insertion order.
        CREATE TABLE IF NOT EXISTS chat_history (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     TEXT NOT NULL,
            role        TEXT NOT NULL
                        CHECK (role IN ('user', 'model')),
            text        TEXT NOT NULL DEFAULT '',
            created_at  INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_chat_history_user_created
            ON chat_history (user_id, created_at DESC, id DESC);

        INSERT INTO schema_migrations (version, name) VALUES (1, 'chat_history');
        ",
    )
    .map_err(|e| KisanError::Storage(format!("Failed to apply migration v1: {}", e)))?;

    Ok(())
}

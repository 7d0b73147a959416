//! Kisan Store crate - per-user append-only chat log over SQLite.
//!
//! Provides a WAL-mode SQLite database with migrations and the
//! [`HistoryStore`] contract consumed by both the live conversation session
//! and the history review screen. The store, not the client, is the ordering
//! authority: ids and creation times are assigned on append and retrieval is
//! newest-first.

pub mod db;
pub mod history;
pub mod migrations;

pub use db::Database;
pub use history::{HistoryStore, SqliteHistory};

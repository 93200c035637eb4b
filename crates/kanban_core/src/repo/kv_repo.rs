//! Key-value document persistence.
//!
//! # Responsibility
//! - Store opaque text blobs under fixed document keys.
//! - Shield callers from storage read failures.
//!
//! # Invariants
//! - `load` never returns an error: failures are logged and read as absent.
//! - `save` replaces the whole value stored under a key.

use crate::db::DbError;
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Canonical workspace document.
pub const WORKSPACE_KEY: &str = "kanban.workspace.v1";
/// Pre-workspace flat task list (migration input only).
pub const LEGACY_TASKS_KEY: &str = "kanban.board.v1";
/// Pre-workspace notes blob or list (migration input only).
pub const LEGACY_NOTES_KEY: &str = "kanban.notes.v1";
/// Board/notes view flag.
pub const VIEW_MODE_KEY: &str = "kanban.view.v1";
/// Dark/light theme flag.
pub const THEME_KEY: &str = "kanban.theme.v1";

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence adapter error.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Connection was not migrated; the named table is missing.
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "document store requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Blob store scoped by document key.
pub trait KeyValueStore {
    /// Reads the value under `key`; absent on any failure.
    fn load(&self, key: &str) -> Option<String>;
    /// Replaces the value under `key`.
    fn save(&mut self, key: &str, value: &str) -> RepoResult<()>;
}

/// SQLite-backed document store over a migrated connection.
pub struct SqliteKeyValueStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKeyValueStore<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = 'kv_entries'
            );",
            [],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable("kv_entries"));
        }
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteKeyValueStore<'_> {
    fn load(&self, key: &str) -> Option<String> {
        let result = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional();
        match result {
            Ok(value) => value,
            Err(err) => {
                warn!("event=kv_load module=repo status=error key={key} error={err}");
                None
            }
        }
    }

    fn save(&mut self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

/// In-memory document store for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: BTreeMap<String, String>,
    save_count: usize,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style seeding of one entry.
    pub fn with_entry(mut self, key: &str, value: impl Into<String>) -> Self {
        self.entries.insert(key.to_string(), value.into());
        self
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> usize {
        self.save_count
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) -> RepoResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.save_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStore, MemoryKeyValueStore, RepoError, SqliteKeyValueStore};
    use crate::db::open_db_in_memory;
    use rusqlite::Connection;

    #[test]
    fn sqlite_store_upserts_values() {
        let conn = open_db_in_memory().unwrap();
        let mut store = SqliteKeyValueStore::try_new(&conn).unwrap();
        assert_eq!(store.load("k"), None);

        store.save("k", "one").unwrap();
        store.save("k", "two").unwrap();
        assert_eq!(store.load("k").as_deref(), Some("two"));
    }

    #[test]
    fn unmigrated_connection_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteKeyValueStore::try_new(&conn).err().unwrap();
        assert!(matches!(err, RepoError::MissingRequiredTable("kv_entries")));
    }

    #[test]
    fn memory_store_counts_saves() {
        let mut store = MemoryKeyValueStore::new().with_entry("a", "1");
        store.save("b", "2").unwrap();
        assert_eq!(store.load("a").as_deref(), Some("1"));
        assert_eq!(store.save_count(), 1);
    }
}

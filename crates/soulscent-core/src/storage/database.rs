//! SQLite-backed key-value store.
//!
//! The one thing the client persists across reloads is the current
//! analytics session id, so a reload can keep attributing events to the
//! session it interrupted. Everything else (phase, mood, audio) starts
//! fresh on every load.

use rusqlite::{params, Connection};
use std::path::Path;

use super::data_dir;
use crate::error::StorageError;

const CURRENT_SESSION_KEY: &str = "current_session_id";

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/soulscent/soulscent.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()?.join("soulscent.db");
        Self::open_at(&path)
    }

    /// Open at an explicit path (tests, portable installs).
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|e| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (tests, ephemeral hosts).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    pub fn kv_delete(&self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// The analytics session id that survives reloads, if any.
    pub fn current_session_id(&self) -> Result<Option<String>, StorageError> {
        self.kv_get(CURRENT_SESSION_KEY)
    }

    pub fn set_current_session_id(&self, id: &str) -> Result<(), StorageError> {
        self.kv_set(CURRENT_SESSION_KEY, id)
    }

    pub fn clear_current_session_id(&self) -> Result<(), StorageError> {
        self.kv_delete(CURRENT_SESSION_KEY)
    }
}

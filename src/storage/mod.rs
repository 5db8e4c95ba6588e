//! Local persisted state: a small SQLite key/value table holding the current
//! theme and arbitrary JSON blobs.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

const DB_FILE: &str = "graph-explorer.db";
pub const THEME_KEY: &str = "CURRENT_THEME";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to create data directory `{path}`: {source}")]
    DataDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("stored value for `{key}` is not valid JSON: {source}")]
    Json {
        key: String,
        source: serde_json::Error,
    },
}

pub struct LocalStore {
    conn: Connection,
}

impl LocalStore {
    /// Open (creating if needed) the store inside `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(data_dir).map_err(|source| StorageError::DataDir {
            path: data_dir.to_path_buf(),
            source,
        })?;
        let conn = Connection::open(data_dir.join(DB_FILE))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS local_state (
             state_key TEXT PRIMARY KEY,
             state_value TEXT NOT NULL,
             updated_at INTEGER NOT NULL DEFAULT (strftime('%s','now'))
           );",
        )?;
        Ok(Self { conn })
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO local_state (state_key, state_value, updated_at)
           VALUES (?1, ?2, strftime('%s','now'))
           ON CONFLICT(state_key)
           DO UPDATE SET
             state_value = excluded.state_value,
             updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row(
                "SELECT state_value FROM local_state WHERE state_key = ?1 LIMIT 1;",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM local_state WHERE state_key = ?1;", params![key])?;
        Ok(())
    }

    pub fn save_theme(&self, theme: &str) -> Result<(), StorageError> {
        self.set_item(THEME_KEY, theme)
    }

    pub fn read_theme(&self) -> Result<Option<String>, StorageError> {
        self.get_item(THEME_KEY)
    }

    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Json {
            key: key.to_string(),
            source,
        })?;
        self.set_item(key, &raw)
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.get_item(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Json {
                key: key.to_string(),
                source,
            })
    }
}

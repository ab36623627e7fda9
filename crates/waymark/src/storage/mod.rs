//! Storage layer for waymark.
//!
//! This module provides the `SQLite`-backed preference store: a key-value
//! table with `get`/`set`/`remove` semantics. The location ledger keeps its
//! serialized blob under a single fixed key.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Key-value preference store.
///
/// Values are opaque strings; callers decide the encoding. An absent key is
/// distinct from a key holding an empty value, and that distinction is part
/// of the ledger's contract (a cleared ledger deletes its key, an emptied
/// one stores an empty list).
#[derive(Debug)]
pub struct PrefStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl PrefStore {
    /// Open or create a preference store at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema
    /// initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // Enable WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the value stored under `key`, or `None` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Store `value` under `key`, replacing any existing value.
    ///
    /// The write is synchronous; when this returns the value is durable.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO preferences (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')
            ",
            [key, value],
        )?;
        debug!("Stored preference '{}' ({} bytes)", key, value.len());
        Ok(())
    }

    /// Remove `key` entirely.
    ///
    /// Returns `true` if a value was deleted, `false` if the key was absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM preferences WHERE key = ?1", [key])?;
        Ok(affected > 0)
    }

    /// Check whether `key` holds a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn contains(&self, key: &str) -> Result<bool> {
        let count: i32 = self.conn.query_row(
            "SELECT COUNT(*) FROM preferences WHERE key = ?1",
            [key],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> PrefStore {
        PrefStore::open_in_memory().expect("failed to create test store")
    }

    #[test]
    fn test_open_in_memory() {
        let store = PrefStore::open_in_memory();
        assert!(store.is_ok());
    }

    #[test]
    fn test_get_absent_key() {
        let store = create_test_store();
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn test_set_and_get() {
        let store = create_test_store();
        store.set("greeting", "hello").unwrap();
        assert_eq!(store.get("greeting").unwrap(), Some("hello".to_string()));
    }

    #[test]
    fn test_set_overwrites() {
        let store = create_test_store();
        store.set("key", "first").unwrap();
        store.set("key", "second").unwrap();
        assert_eq!(store.get("key").unwrap(), Some("second".to_string()));
    }

    #[test]
    fn test_empty_value_is_not_absent() {
        let store = create_test_store();
        store.set("key", "").unwrap();

        assert_eq!(store.get("key").unwrap(), Some(String::new()));
        assert!(store.contains("key").unwrap());
    }

    #[test]
    fn test_remove() {
        let store = create_test_store();
        store.set("key", "value").unwrap();

        assert!(store.remove("key").unwrap());
        assert_eq!(store.get("key").unwrap(), None);
        assert!(!store.contains("key").unwrap());
    }

    #[test]
    fn test_remove_absent_key() {
        let store = create_test_store();
        assert!(!store.remove("missing").unwrap());
    }

    #[test]
    fn test_contains() {
        let store = create_test_store();
        assert!(!store.contains("key").unwrap());

        store.set("key", "value").unwrap();
        assert!(store.contains("key").unwrap());
    }

    #[test]
    fn test_unicode_value() {
        let store = create_test_store();
        store.set("name", "위치이름 🌍").unwrap();
        assert_eq!(store.get("name").unwrap(), Some("위치이름 🌍".to_string()));
    }

    #[test]
    fn test_keys_are_independent() {
        let store = create_test_store();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();

        store.remove("a").unwrap();
        assert_eq!(store.get("b").unwrap(), Some("2".to_string()));
    }

    #[test]
    fn test_path() {
        let store = create_test_store();
        assert_eq!(store.path().to_string_lossy(), ":memory:");
    }

    #[test]
    fn test_open_file_based() {
        let temp_dir = std::env::temp_dir();
        let db_path = temp_dir.join(format!("waymark_test_{}.db", std::process::id()));

        let store = PrefStore::open(&db_path).unwrap();
        store.set("key", "value").unwrap();
        assert_eq!(store.path(), db_path);

        // Reopen and verify the value survived
        drop(store);
        let store = PrefStore::open(&db_path).unwrap();
        assert_eq!(store.get("key").unwrap(), Some("value".to_string()));

        drop(store);
        let _ = std::fs::remove_file(&db_path);
        let _ = std::fs::remove_file(db_path.with_extension("db-wal"));
        let _ = std::fs::remove_file(db_path.with_extension("db-shm"));
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let temp_dir = std::env::temp_dir();
        let nested_path = temp_dir.join(format!(
            "waymark_test_{}/nested/db.sqlite",
            std::process::id()
        ));

        if let Some(parent) = nested_path.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }

        let store = PrefStore::open(&nested_path).unwrap();
        assert!(nested_path.exists());

        drop(store);
        if let Some(parent) = nested_path.parent() {
            let _ = std::fs::remove_dir_all(parent.parent().unwrap());
        }
    }
}

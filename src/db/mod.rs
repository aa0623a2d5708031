use chrono::Utc;
use rusqlite::{params, Connection};
use serde::{de::DeserializeOwned, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

mod collection;
pub mod departments;
pub mod employees;
mod schema;
pub mod seed;

pub use collection::Collection;
pub use schema::SCHEMA_VERSION;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("stored data under '{key}' is corrupt: {source}")]
    CorruptState {
        key: String,
        source: serde_json::Error,
    },
    #[error("no record with id {id} in '{key}'")]
    NotFound { key: String, id: String },
    #[error("'{name}' already exists in '{key}'")]
    Duplicate { key: String, name: String },
    #[error("could not serialize '{key}': {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },
    #[error("storage error: {0}")]
    Backend(#[from] rusqlite::Error),
    #[error("could not prepare storage directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Raw key/value persistence, the moral equivalent of browser local storage.
///
/// Implementations only move strings around; typed access goes through
/// [`StoreExt`] so every backend gets the same parse rules.
pub trait LocalStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

pub trait StoreExt: LocalStore {
    /// Load the collection stored under `key`.
    ///
    /// A missing key is an empty collection. Anything that does not parse as
    /// an array of `T` is reported as [`StoreError::CorruptState`].
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StoreError> {
        match self.read(key)? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::CorruptState {
                key: key.to_string(),
                source,
            }),
        }
    }

    /// Overwrite the whole collection under `key`
    fn save<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(items).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;
        debug!(key, count = items.len(), "saving collection");
        self.write(key, &raw)
    }

    /// Plain string setting. Blank values read back as None.
    fn get_scalar(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read(key)?.filter(|v| !v.trim().is_empty()))
    }

    fn set_scalar(&self, key: &str, value: &str) -> Result<(), StoreError> {
        debug!(key, "saving setting");
        self.write(key, value)
    }
}

impl<S: LocalStore + ?Sized> StoreExt for S {}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database, creating if needed, running migrations
    pub fn open() -> Result<Self, StoreError> {
        let path = Self::default_path()?;
        Self::open_at(path)
    }

    pub fn open_at(path: PathBuf) -> Result<Self, StoreError> {
        // Create parent directories
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;
        debug!(path = %path.display(), "opened database");

        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open in-memory database for testing
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;

        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn default_path() -> Result<PathBuf, StoreError> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "could not find config directory")
        })?;
        Ok(config_dir.join("hrboard").join("hrboard.db"))
    }

    /// Every stored key with the time it was last written
    pub fn keys(&self) -> Result<Vec<(String, Option<String>)>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, updated_at FROM local_storage ORDER BY key ASC")?;

        let keys = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(keys)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        let version = self.get_schema_version()?;

        if version == 0 {
            // Run migration in a transaction for atomicity
            self.conn
                .execute_batch(&format!("BEGIN TRANSACTION; {} COMMIT;", schema::SCHEMA_V1))?;
            self.set_schema_version(1)?;
        }

        if version < 2 {
            self.conn.execute_batch(schema::MIGRATION_V2)?;
            self.set_schema_version(2)?;
        }

        Ok(())
    }

    fn get_schema_version(&self) -> Result<i32, StoreError> {
        let result: Result<i32, _> =
            self.conn
                .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                    row.get(0)
                });

        match result {
            Ok(v) => Ok(v),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(rusqlite::Error::SqliteFailure(err, msg)) => {
                // "no such table" is error code 1 (SQLITE_ERROR)
                if err.code == rusqlite::ErrorCode::Unknown
                    && msg.as_ref().map_or(false, |m| m.contains("no such table"))
                {
                    Ok(0)
                } else {
                    Err(rusqlite::Error::SqliteFailure(err, msg).into())
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    fn set_schema_version(&self, version: i32) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO schema_version (id, version) VALUES (1, ?)",
            [version],
        )?;
        Ok(())
    }
}

impl LocalStore for Database {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let result = self.conn.query_row(
            "SELECT value FROM local_storage WHERE key = ?",
            [key],
            |row| row.get(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            r#"INSERT INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)
               ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM local_storage WHERE key = ?", [key])?;
        Ok(())
    }
}

/// Volatile store, handy where a throwaway backend is enough
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        name: String,
        amount: f64,
        tags: Vec<String>,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { name: "a".to_string(), amount: 1.5, tags: vec![] },
            Row { name: "b \"quoted\"".to_string(), amount: -2.0, tags: vec!["x".to_string()] },
        ]
    }

    #[test]
    fn test_open_memory() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.get_schema_version().unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_open_at_creates_file_and_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("hr.db");

        {
            let db = Database::open_at(path.clone()).unwrap();
            db.save("employees", &rows()).unwrap();
        }

        let db = Database::open_at(path).unwrap();
        assert_eq!(db.get_schema_version().unwrap(), SCHEMA_VERSION);
        assert_eq!(db.load::<Row>("employees").unwrap(), rows());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let db = Database::open_memory().unwrap();
        db.save("rows", &rows()).unwrap();
        assert_eq!(db.load::<Row>("rows").unwrap(), rows());

        let mem = MemoryStore::new();
        mem.save("rows", &rows()).unwrap();
        assert_eq!(mem.load::<Row>("rows").unwrap(), rows());
    }

    #[test]
    fn test_missing_key_is_empty() {
        let db = Database::open_memory().unwrap();
        assert!(db.load::<Row>("nothing").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_json_is_corrupt_state() {
        let db = Database::open_memory().unwrap();
        db.write("employees", "{not json").unwrap();

        match db.load::<Row>("employees") {
            Err(StoreError::CorruptState { key, .. }) => assert_eq!(key, "employees"),
            other => panic!("expected CorruptState, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_shape_is_corrupt_state() {
        let db = Database::open_memory().unwrap();
        db.write("employees", r#"[{"name": 5}]"#).unwrap();
        assert!(matches!(
            db.load::<Row>("employees"),
            Err(StoreError::CorruptState { .. })
        ));
    }

    #[test]
    fn test_save_overwrites_whole_value() {
        let db = Database::open_memory().unwrap();
        db.save("rows", &rows()).unwrap();
        db.save("rows", &rows()[..1]).unwrap();
        assert_eq!(db.load::<Row>("rows").unwrap().len(), 1);
    }

    #[test]
    fn test_scalars() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.get_scalar("theme").unwrap(), None);
        db.set_scalar("theme", "dark").unwrap();
        assert_eq!(db.get_scalar("theme").unwrap(), Some("dark".to_string()));
        db.set_scalar("theme", "  ").unwrap();
        assert_eq!(db.get_scalar("theme").unwrap(), None);
        db.remove("theme").unwrap();
        assert_eq!(db.read("theme").unwrap(), None);
    }

    #[test]
    fn test_keys_lists_written_keys() {
        let db = Database::open_memory().unwrap();
        db.set_scalar("userName", "admin").unwrap();
        db.save("jobs", &rows()).unwrap();

        let keys = db.keys().unwrap();
        let names: Vec<&str> = keys.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["jobs", "userName"]);
        assert!(keys.iter().all(|(_, at)| at.is_some()));
    }
}

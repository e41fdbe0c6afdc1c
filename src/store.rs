//! Persistent key-value records.
//!
//! A [`Store`] holds named records of serialized JSON. The task collection
//! and the theme preference each live in one record. Unreadable or corrupt
//! records are logged and replaced by the caller's default; they never
//! surface as errors. A record that fails to deserialize is moved aside
//! first, so the next write cannot destroy it.
//!
//! # File layout
//!
//! ```text
//! <data_dir>/
//!   config.toml               # Optional configuration
//!   enhancedTodoTasks.json    # Task collection (JSON array)
//!   enhancedTodoTasks.json.lock
//!   darkMode.json             # Theme preference (JSON boolean)
//!   <key>.json.corrupt        # Last record that failed to deserialize
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};

/// Backing medium for named records.
pub trait Store {
    /// Raw record content, `None` when the record does not exist.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the record in a single write.
    fn write(&mut self, key: &str, value: &str) -> Result<()>;

    /// Move an undecodable record out of the way. Returns where it went,
    /// `None` when the store keeps nothing worth preserving.
    fn quarantine(&self, _key: &str) -> Result<Option<PathBuf>> {
        Ok(None)
    }

    /// Typed read with fallback: missing, unreadable and malformed records
    /// all yield `default`.
    fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T
    where
        Self: Sized,
    {
        let raw = match self.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(err) => {
                warn!(key, error = %err, "store record unreadable, using default");
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                match self.quarantine(key) {
                    Ok(Some(moved)) => warn!(
                        key,
                        error = %err,
                        moved_to = %moved.display(),
                        "store record malformed, moved aside; using default"
                    ),
                    Ok(None) => warn!(key, error = %err, "store record malformed, using default"),
                    Err(move_err) => warn!(
                        key,
                        error = %err,
                        move_error = %move_err,
                        "store record malformed and could not be moved aside; using default"
                    ),
                }
                default
            }
        }
    }

    /// Serialize `value` and write it as one record.
    fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()>
    where
        Self: Sized,
    {
        let json = serde_json::to_string_pretty(value)?;
        self.write(key, &json)
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty()
        || !key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
    {
        return Err(Error::InvalidArgument(format!(
            "invalid store key '{key}' (expected [A-Za-z0-9_-])"
        )));
    }
    Ok(())
}

/// Records stored as `<dir>/<key>.json`, written atomically under a lock.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    lock_timeout_ms: u64,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    /// Path of the file backing `key`
    pub fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Where an undecodable `key` record is moved; replaces any earlier one.
    pub fn quarantine_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json.corrupt"))
    }
}

impl Store for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        let path = self.record_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        let path = self.record_path(key);
        lock::write_atomic_locked(&path, value.as_bytes(), self.lock_timeout_ms)
    }

    fn quarantine(&self, key: &str) -> Result<Option<PathBuf>> {
        validate_key(key)?;
        let path = self.record_path(key);
        let _lock = FileLock::acquire(lock::lock_path_for(&path), self.lock_timeout_ms)?;
        if !path.exists() {
            return Ok(None);
        }
        let target = self.quarantine_path(key);
        fs::rename(&path, &target)?;
        Ok(Some(target))
    }
}

/// In-process store, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: HashMap<String, String>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw record, e.g. to simulate corrupt data.
    pub fn with_record(mut self, key: &str, raw: &str) -> Self {
        self.records.insert(key.to_string(), raw.to_string());
        self
    }

    /// Make every subsequent write fail.
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.records.get(key).map(String::as_str)
    }
}

impl Store for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.records.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes {
            return Err(Error::OperationFailed(format!(
                "write to '{key}' rejected"
            )));
        }
        self.records.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn get_falls_back_when_missing() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());
        let tasks: Vec<u32> = store.get("tasks", Vec::new());
        assert!(tasks.is_empty());
        assert!(!store.get("darkMode", false));
    }

    #[test]
    fn set_then_get_round_trips() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStore::new(temp.path());
        store.set("tasks", &vec![1, 2, 3]).unwrap();

        assert!(store.record_path("tasks").exists());
        let tasks: Vec<u32> = store.get("tasks", Vec::new());
        assert_eq!(tasks, vec![1, 2, 3]);
    }

    #[test]
    fn malformed_record_yields_default() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());
        fs::write(store.record_path("tasks"), "{not json").unwrap();

        let tasks: Vec<u32> = store.get("tasks", vec![7]);
        assert_eq!(tasks, vec![7]);
    }

    #[test]
    fn malformed_record_is_moved_aside_before_next_write() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStore::new(temp.path());
        fs::write(store.record_path("tasks"), "[1, \"two\", 3]").unwrap();

        let tasks: Vec<u32> = store.get("tasks", Vec::new());
        assert!(tasks.is_empty());
        assert!(!store.record_path("tasks").exists());
        assert_eq!(
            fs::read_to_string(store.quarantine_path("tasks")).unwrap(),
            "[1, \"two\", 3]"
        );

        store.set("tasks", &vec![4]).unwrap();
        assert_eq!(
            fs::read_to_string(store.quarantine_path("tasks")).unwrap(),
            "[1, \"two\", 3]"
        );
        let tasks: Vec<u32> = store.get("tasks", Vec::new());
        assert_eq!(tasks, vec![4]);
    }

    #[test]
    fn wrong_shape_yields_default() {
        let store = MemoryStore::new().with_record("darkMode", "\"yes\"");
        assert!(!store.get("darkMode", false));
    }

    #[test]
    fn rejects_path_like_keys() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStore::new(temp.path());
        assert!(matches!(
            store.write("../escape", "[]"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(store.read("").is_err());
    }

    #[test]
    fn memory_store_can_fail_writes() {
        let mut store = MemoryStore::new();
        store.fail_writes(true);
        assert!(store.set("tasks", &Vec::<u32>::new()).is_err());
        assert!(store.raw("tasks").is_none());
    }
}

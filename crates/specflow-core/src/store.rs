//! Durable key-value storage for session results
//!
//! A single string slot per key, overwritten on every write. The file-backed
//! store keeps a flat JSON object on disk and rewrites it atomically.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::stats::SessionStats;

/// Key under which the last session's statistics are stored
pub const STATS_KEY: &str = "spectrogramStats";

/// Storage errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// File system failure
    #[error("Storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// The store file or a stored value is not valid JSON
    #[error("Storage JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No platform data directory to put the store in
    #[error("No local data directory available")]
    NoDataDir,
}

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// String-keyed, string-valued storage
pub trait KeyValueStore {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn put(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store for tests and `--synthetic` runs without persistence
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no key is set
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object file on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// `<local data dir>/SpecFlow/storage.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join("SpecFlow").join("storage.json"))
    }

    /// Open the store at the default location
    pub fn open_default() -> Result<Self> {
        let path = Self::default_path().ok_or(StoreError::NoDataDir)?;
        Self::open(path)
    }

    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file is an empty store; the file is only created on the first
    /// write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!("Opened store {:?} with {} keys", path, entries.len());
        Ok(Self { path, entries })
    }

    /// File backing this store
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;

        // Write beside the target and rename over it so a crash never leaves
        // a half-written file behind.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush() {
            // Keep memory and disk in step
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}

/// Overwrite the stored statistics with `stats`
pub fn persist_stats(store: &mut dyn KeyValueStore, stats: &SessionStats) -> Result<()> {
    let json = serde_json::to_string(stats)?;
    store.put(STATS_KEY, &json)?;
    info!("Session statistics saved: {}", json);
    Ok(())
}

/// Read the statistics of the last finished session, if any
pub fn load_stats(store: &dyn KeyValueStore) -> Result<Option<SessionStats>> {
    store
        .get(STATS_KEY)?
        .map(|json| serde_json::from_str(&json).map_err(StoreError::from))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatValue;
    use tempfile::tempdir;

    fn sample_stats() -> SessionStats {
        SessionStats {
            max_frequency: StatValue::Value(300.0),
            min_frequency: StatValue::Value(100.0),
            mean_frequency: StatValue::Value(200.0),
            frequency_range: StatValue::Value(200.0),
            mean_amplitude: StatValue::Value(20.0),
        }
    }

    #[test]
    fn test_memory_store_overwrites() {
        let mut store = MemoryStore::new();
        store.put("k", "one").unwrap();
        store.put("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("nope.json")).unwrap();
        assert_eq!(store.get(STATS_KEY).unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        persist_stats(&mut store, &sample_stats()).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(load_stats(&reopened).unwrap(), Some(sample_stats()));
    }

    #[test]
    fn test_stored_value_shape() {
        let mut store = MemoryStore::new();
        persist_stats(&mut store, &sample_stats()).unwrap();
        let raw = store.get(STATS_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["meanFrequency"], "200.00");
        assert_eq!(value["frequencyRange"], "200.00");
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StoreError::Json(_))
        ));
    }

    #[test]
    fn test_load_stats_empty_store() {
        assert_eq!(load_stats(&MemoryStore::new()).unwrap(), None);
    }
}

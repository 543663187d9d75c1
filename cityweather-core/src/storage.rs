//! Device-local key-value storage for small string values.

use std::{
    collections::{BTreeMap, HashMap},
    fmt::Debug,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::anyhow;
use async_trait::async_trait;
use directories::ProjectDirs;
use parking_lot::Mutex;

use crate::error::StorageError;

/// Key under which the last selected city is stored.
pub const LAST_CITY_KEY: &str = "city";

#[async_trait]
pub trait KeyValueStore: Send + Sync + Debug {
    /// `Ok(None)` for keys that were never written.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// All keys in one JSON object file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: tokio::sync::Mutex::new(()) }
    }

    /// Store in the platform data directory.
    pub fn open_default() -> anyhow::Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn default_path() -> anyhow::Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cityweather", "cityweather")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

        Ok(dirs.data_dir().join("storage.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => return Err(StorageError::Io { path: self.path.clone(), source }),
        };

        serde_json::from_str(&contents)
            .map_err(|source| StorageError::Corrupt { path: self.path.clone(), source })
    }

    async fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io { path: self.path.clone(), source };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(entries)
            .map_err(|source| StorageError::Corrupt { path: self.path.clone(), source })?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut entries = self.read_all().await?;
        Ok(entries.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut entries = match self.read_all().await {
            Ok(entries) => entries,
            Err(StorageError::Corrupt { path, source }) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %source,
                    "replacing corrupt store file"
                );
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries).await?;

        tracing::debug!(key, path = %self.path.display(), "stored value");
        Ok(())
    }
}

/// Process-local store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.entries.lock().insert(key.to_string(), value.to_string());
        store
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_reads_as_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("nested").join("storage.json"));

        assert_eq!(store.get(LAST_CITY_KEY).await.expect("get"), None);
    }

    #[tokio::test]
    async fn set_then_get_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("storage.json");

        FileStore::new(&path).set(LAST_CITY_KEY, "Paris,France").await.expect("set");

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get(LAST_CITY_KEY).await.expect("get").as_deref(),
            Some("Paris,France")
        );
    }

    #[tokio::test]
    async fn set_keeps_other_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("storage.json"));

        store.set("units", "metric").await.expect("set units");
        store.set(LAST_CITY_KEY, "Oslo,Norway").await.expect("set city");
        store.set(LAST_CITY_KEY, "Rome,Italy").await.expect("overwrite city");

        assert_eq!(store.get("units").await.expect("get").as_deref(), Some("metric"));
        assert_eq!(store.get(LAST_CITY_KEY).await.expect("get").as_deref(), Some("Rome,Italy"));
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{ not json").expect("write garbage");

        let err = FileStore::new(&path).get(LAST_CITY_KEY).await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn set_replaces_corrupt_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{ not json").expect("write garbage");

        let store = FileStore::new(&path);
        store.set(LAST_CITY_KEY, "Paris,France").await.expect("set over corrupt file");

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get(LAST_CITY_KEY).await.expect("get").as_deref(),
            Some("Paris,France")
        );
    }

    #[tokio::test]
    async fn memory_store_roundtrip() {
        let store = MemoryStore::with_entry(LAST_CITY_KEY, "Lima,Peru");
        assert_eq!(store.get(LAST_CITY_KEY).await.expect("get").as_deref(), Some("Lima,Peru"));
        assert_eq!(store.get("other").await.expect("get"), None);
    }
}

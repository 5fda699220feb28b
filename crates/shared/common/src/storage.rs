//! Key-value storage backends.
//!
//! Values are opaque strings addressed by key. Callers serialize their
//! own payloads; the backends only persist them.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use crate::config::LoadPolicy;
use crate::error::{AppError, AppResult};

/// String key-value store injected into the repository and session tracker.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, if any
    fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Delete `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> AppResult<()>;
}

fn poisoned() -> AppError {
    AppError::internal("storage lock poisoned")
}

// =============================================================================
// In-memory
// =============================================================================

/// Process-local store, used for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the given entries
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// JSON file
// =============================================================================

/// Store persisted as a single JSON object in one file.
///
/// The whole map is loaded on open and rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`; a missing file is an empty store.
    ///
    /// A file that is not a JSON object of strings is handled according to
    /// `policy`. Under [`LoadPolicy::Discard`] it opens empty and is replaced
    /// on the first write.
    pub fn open(path: impl Into<PathBuf>, policy: LoadPolicy) -> AppResult<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => match policy {
                    LoadPolicy::Discard => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Store file is unreadable, starting empty"
                        );
                        BTreeMap::new()
                    }
                    LoadPolicy::Strict => {
                        return Err(AppError::corrupt(format!("{}: {}", path.display(), e)));
                    }
                },
            },
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "File store opened");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the map next to the target, then move it into place
    fn flush(&self, entries: &BTreeMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush(&entries) {
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        let Some(previous) = entries.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.flush(&entries) {
            entries.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_memory_store_with_entries() {
        let store = MemoryStore::with_entries([("a", "1"), ("b", "2")]);
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("absent.json"), LoadPolicy::Discard).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = FileStore::open(&path, LoadPolicy::Discard).unwrap();
        store.set("crud_usuarios", "[]").unwrap();
        store.set("crud_auth_user", "admin").unwrap();
        store.remove("crud_auth_user").unwrap();
        drop(store);

        let reopened = FileStore::open(&path, LoadPolicy::Discard).unwrap();
        assert_eq!(reopened.get("crud_usuarios").unwrap().as_deref(), Some("[]"));
        assert_eq!(reopened.get("crud_auth_user").unwrap(), None);
    }

    #[test]
    fn test_file_store_strict_rejects_garbage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not json").unwrap();

        let result = FileStore::open(&path, LoadPolicy::Strict);
        assert!(matches!(result, Err(AppError::CorruptData(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "not json");
    }

    #[test]
    fn test_file_store_discards_garbage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not json").unwrap();

        let store = FileStore::open(&path, LoadPolicy::Discard).unwrap();
        assert_eq!(store.get("crud_usuarios").unwrap(), None);
        assert_eq!(fs::read_to_string(&path).unwrap(), "not json");

        store.set("crud_auth_user", "admin").unwrap();
        let reopened = FileStore::open(&path, LoadPolicy::Strict).unwrap();
        assert_eq!(reopened.get("crud_auth_user").unwrap().as_deref(), Some("admin"));
    }

    #[test]
    fn test_mock_store_records_calls() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_set()
            .withf(|key, value| key == "k" && value == "v")
            .times(1)
            .returning(|_, _| Ok(()));

        store.set("k", "v").unwrap();
    }
}

use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Durable map from string keys to JSON values.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;

    fn set(&self, key: &str, value: Value) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// Drop every key.
    fn clear(&self) -> Result<()>;

    /// Replace the value under `key` with what `change` returns for the
    /// current one, with no other writer in between. `None` removes the key.
    fn update(&self, key: &str, change: &mut dyn FnMut(Option<Value>) -> Result<Option<Value>>) -> Result<()>;
}

/// Typed access on top of any [`KeyValueStore`].
pub trait KeyValueStoreExt: KeyValueStore {
    fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .with_context(|| format!("Failed to decode value for key: {}", key)),
            None => Ok(None),
        }
    }

    fn set_as<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)
            .with_context(|| format!("Failed to encode value for key: {}", key))?;
        self.set(key, value)
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Typed [`KeyValueStore::update`].
    fn update_as<T, F>(&self, key: &str, mut change: F) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
        F: FnMut(Option<T>) -> Result<Option<T>>,
    {
        self.update(key, &mut |current: Option<Value>| -> Result<Option<Value>> {
            let current: Option<T> = current
                .map(serde_json::from_value)
                .transpose()
                .with_context(|| format!("Failed to decode value for key: {}", key))?;
            change(current)?
                .map(serde_json::to_value)
                .transpose()
                .with_context(|| format!("Failed to encode value for key: {}", key))
        })
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}

/// Keeps every entry in a single pretty-printed JSON object on disk. Every
/// call reads the file again under an exclusive lock on `<path>.lock`, so
/// several processes can share one file. Writes go through a temporary file
/// and a rename.
pub struct JsonFileStore {
    path: PathBuf,
    lock_path: PathBuf,
    local: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store at `path`, creating parent directories if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create preferences directory")?;
        }

        let store = Self {
            lock_path: sibling_path(&path, "lock"),
            path,
            local: Mutex::new(()),
        };

        let keys = store.with_entries(|entries| Ok((entries.len(), false)))?;
        debug!("Opened preferences at {} ({} keys)", store.path.display(), keys);

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` on the current entries while holding both locks. The file is
    /// rewritten when `f` reports a change.
    fn with_entries<R>(&self, f: impl FnOnce(&mut Map<String, Value>) -> Result<(R, bool)>) -> Result<R> {
        let _local = self
            .local
            .lock()
            .map_err(|_| anyhow::anyhow!("Preferences lock poisoned"))?;

        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&self.lock_path)
            .context("Failed to open preferences lock file")?;
        FileExt::lock_exclusive(&lock_file).context("Failed to lock preferences file")?;

        let mut entries = Self::read_entries(&self.path)?;
        let (result, changed) = f(&mut entries)?;
        if changed {
            self.write_entries(&entries)?;
        }

        // Closing the file releases the lock.
        drop(lock_file);
        Ok(result)
    }

    fn read_entries(path: &Path) -> Result<Map<String, Value>> {
        if !path.exists() {
            return Ok(Map::new());
        }

        let json = fs::read_to_string(path).context("Failed to read preferences file")?;
        if json.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(&json).with_context(|| {
            format!(
                "Failed to parse JSON from {:?}. First 200 chars: {}",
                path,
                json.chars().take(200).collect::<String>()
            )
        })
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> Result<()> {
        let json = serde_json::to_string_pretty(entries).context("Failed to serialize preferences")?;
        let tmp_path = sibling_path(&self.path, "tmp");

        fs::write(&tmp_path, json).context("Failed to write preferences file")?;
        fs::rename(&tmp_path, &self.path).context("Failed to replace preferences file")?;
        Ok(())
    }
}

fn sibling_path(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        self.with_entries(|entries| Ok((entries.get(key).cloned(), false)))
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.with_entries(|entries| {
            entries.insert(key.to_string(), value);
            Ok(((), true))
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.with_entries(|entries| Ok(((), entries.remove(key).is_some())))
    }

    fn clear(&self) -> Result<()> {
        self.with_entries(|entries| {
            entries.clear();
            Ok(((), true))
        })?;

        info!("Cleared preferences at {}", self.path.display());
        Ok(())
    }

    fn update(&self, key: &str, change: &mut dyn FnMut(Option<Value>) -> Result<Option<Value>>) -> Result<()> {
        self.with_entries(|entries| {
            match change(entries.get(key).cloned())? {
                Some(value) => {
                    entries.insert(key.to_string(), value);
                }
                None => {
                    entries.remove(key);
                }
            }
            Ok(((), true))
        })
    }
}

/// Process-local store, nothing is persisted.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, Value>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Preferences lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.lock()?.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    fn update(&self, key: &str, change: &mut dyn FnMut(Option<Value>) -> Result<Option<Value>>) -> Result<()> {
        let mut entries = self.lock()?;
        match change(entries.get(key).cloned())? {
            Some(value) => entries.insert(key.to_string(), value),
            None => entries.remove(key),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestData {
        value: String,
    }

    #[test]
    fn test_file_store_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        let store = JsonFileStore::open(&path).unwrap();
        store.set_as("test_key", &TestData { value: "test".to_string() }).unwrap();
        store.set("flag", json!(true)).unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).unwrap();
        let loaded: Option<TestData> = reopened.get_as("test_key").unwrap();
        assert_eq!(loaded, Some(TestData { value: "test".to_string() }));
        assert!(reopened.contains("flag").unwrap());
    }

    #[test]
    fn test_file_store_remove_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("prefs.json")).unwrap();

        store.set("a", json!(1)).unwrap();
        store.set("b", json!(2)).unwrap();
        store.remove("a").unwrap();
        store.remove("missing").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap(), Some(json!(2)));

        store.clear().unwrap();
        assert_eq!(store.get("b").unwrap(), None);
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(JsonFileStore::open(&path).is_err());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set_as("k", &vec!["x", "y"]).unwrap();
        let loaded: Option<Vec<String>> = store.get_as("k").unwrap();
        assert_eq!(loaded, Some(vec!["x".to_string(), "y".to_string()]));

        store.remove("k").unwrap();
        assert!(!store.contains("k").unwrap());
    }

    #[test]
    fn test_get_as_reports_type_mismatch() {
        let store = MemoryStore::new();
        store.set("k", json!("text")).unwrap();

        let result: Result<Option<Vec<String>>> = store.get_as("k");
        assert!(result.is_err());
    }

    #[test]
    fn test_file_stores_on_same_path_see_each_other() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let first = JsonFileStore::open(&path).unwrap();
        let second = JsonFileStore::open(&path).unwrap();

        first.set("flag", json!("2025-10-15T09:20:50+00:00")).unwrap();
        assert!(second.contains("flag").unwrap());

        second.set("other", json!(1)).unwrap();
        assert_eq!(first.get("flag").unwrap(), Some(json!("2025-10-15T09:20:50+00:00")));
        assert_eq!(first.get("other").unwrap(), Some(json!(1)));

        second.remove("flag").unwrap();
        assert!(!first.contains("flag").unwrap());
    }

    #[test]
    fn test_update_as_reads_current_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let first = JsonFileStore::open(&path).unwrap();
        let second = JsonFileStore::open(&path).unwrap();

        first.set_as("count", &1).unwrap();
        second
            .update_as("count", |current: Option<i64>| Ok(Some(current.unwrap_or(0) + 1)))
            .unwrap();
        assert_eq!(first.get_as::<i64>("count").unwrap(), Some(2));

        first.update_as("count", |_: Option<i64>| Ok(None)).unwrap();
        assert!(!second.contains("count").unwrap());
    }

    #[test]
    fn test_memory_store_update() {
        let store = MemoryStore::new();
        store
            .update_as("k", |current: Option<Vec<String>>| {
                assert_eq!(current, None);
                Ok(Some(vec!["x".to_string()]))
            })
            .unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!(["x"])));
    }
}

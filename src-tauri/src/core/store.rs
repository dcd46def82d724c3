use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tauri::{AppHandle, Manager, Runtime};
use tauri_plugin_store::{Store, StoreExt};

use super::error::KeyError;

// ── Key-Value Store ──────────────────────────────────────────────────────────
//
// Everything the app persists lives in one JSON object file.  Writes are
// staged in memory with `set`/`delete` and become durable on `save`; a
// failed save is reloaded away so callers never observe a half-applied
// change.  Another process (the CLI) may write the same file, so callers
// also `reload` before acting on what they read.

pub trait KvStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value);
    fn delete(&mut self, key: &str) -> bool;
    fn save(&mut self) -> Result<(), KeyError>;
    /// Drop the in-memory cache, unsaved changes included, and re-read disk.
    fn reload(&mut self) -> Result<(), KeyError>;
}

/// Flush staged changes, or discard them if the flush fails.
pub fn commit<S: KvStore + ?Sized>(store: &mut S) -> Result<(), KeyError> {
    if let Err(e) = store.save() {
        if let Err(reload_err) = store.reload() {
            log::warn!("store reload after failed save also failed: {}", reload_err);
        }
        return Err(e);
    }
    Ok(())
}

/// A cache that sits in front of a file.  `merge_from_disk` may only add
/// or overwrite entries (the plugin store's reload does exactly that), so
/// `resync` empties the cache first.
pub trait DiskCache {
    fn on_disk(&self) -> bool;
    fn clear_cache(&mut self);
    fn merge_from_disk(&mut self) -> Result<(), KeyError>;
}

pub fn resync<D: DiskCache + ?Sized>(cache: &mut D) -> Result<(), KeyError> {
    cache.clear_cache();
    if cache.on_disk() {
        cache.merge_from_disk()?;
    }
    Ok(())
}

// ── tauri-plugin-store backend (desktop app) ────────────────────────────────

/// The plugin store with autosave off: only `save` ever touches disk.
pub struct PluginStore<R: Runtime> {
    store: Arc<Store<R>>,
    path: PathBuf,
}

impl<R: Runtime> PluginStore<R> {
    /// Opens `file` under the app data directory and syncs it with disk.
    pub fn open(app: &AppHandle<R>, file: &str) -> Result<Self, KeyError> {
        let path = app
            .path()
            .app_data_dir()
            .map_err(|e| KeyError::Persistence(e.to_string()))?
            .join(file);
        let store = app
            .store_builder(file)
            .disable_auto_save()
            .build()
            .map_err(|e| KeyError::Persistence(e.to_string()))?;
        let mut opened = Self { store, path };
        opened.reload()?;
        Ok(opened)
    }
}

impl<R: Runtime> DiskCache for PluginStore<R> {
    fn on_disk(&self) -> bool {
        self.path.exists()
    }

    fn clear_cache(&mut self) {
        self.store.clear();
    }

    fn merge_from_disk(&mut self) -> Result<(), KeyError> {
        self.store
            .reload_ignore_defaults()
            .map_err(|e| KeyError::Persistence(e.to_string()))
    }
}

impl<R: Runtime> KvStore for PluginStore<R> {
    fn get(&self, key: &str) -> Option<Value> {
        self.store.get(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.store.set(key, value);
    }

    fn delete(&mut self, key: &str) -> bool {
        self.store.delete(key)
    }

    fn save(&mut self) -> Result<(), KeyError> {
        self.store
            .save()
            .map_err(|e| KeyError::Persistence(e.to_string()))
    }

    fn reload(&mut self) -> Result<(), KeyError> {
        resync(self)
    }
}

// ── Plain JSON file backend (headless CLI) ───────────────────────────────────

/// Reads and writes the same file layout as the plugin store, so the CLI and
/// the desktop app can share one store.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl JsonFileStore {
    pub fn open(path: &Path) -> Result<Self, KeyError> {
        let entries = read_entries(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }
}

fn read_entries(path: &Path) -> Result<Map<String, Value>, KeyError> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let raw = fs::read_to_string(path)?;
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(&raw)? {
        Value::Object(map) => Ok(map),
        other => Err(KeyError::Persistence(format!(
            "{} must contain a JSON object, found {}",
            path.display(),
            json_kind(&other)
        ))),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    fn save(&mut self) -> Result<(), KeyError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let raw = serde_json::to_vec_pretty(&self.entries)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&raw)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|e| KeyError::Persistence(e.error.to_string()))?;
        Ok(())
    }

    fn reload(&mut self) -> Result<(), KeyError> {
        resync(self)
    }
}

impl DiskCache for JsonFileStore {
    fn on_disk(&self) -> bool {
        self.path.exists()
    }

    fn clear_cache(&mut self) {
        self.entries.clear();
    }

    fn merge_from_disk(&mut self) -> Result<(), KeyError> {
        self.entries.extend(read_entries(&self.path)?);
        Ok(())
    }
}

// ── In-memory backend (tests) ────────────────────────────────────────────────

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Keeps a "disk" snapshot next to the working map.  Reading the
    /// snapshot back merges into the cache, the way the plugin store does.
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        pub entries: Map<String, Value>,
        pub flushed: Map<String, Value>,
        pub on_disk: bool,
        pub fail_saves: bool,
        pub saves: usize,
    }

    impl MemoryStore {
        pub fn seeded(entries: Value) -> Self {
            let map = match entries {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            Self {
                entries: map.clone(),
                flushed: map,
                on_disk: true,
                ..Default::default()
            }
        }
    }

    impl KvStore for MemoryStore {
        fn get(&self, key: &str) -> Option<Value> {
            self.entries.get(key).cloned()
        }

        fn set(&mut self, key: &str, value: Value) {
            self.entries.insert(key.to_string(), value);
        }

        fn delete(&mut self, key: &str) -> bool {
            self.entries.remove(key).is_some()
        }

        fn save(&mut self) -> Result<(), KeyError> {
            if self.fail_saves {
                return Err(KeyError::Persistence("disk full".into()));
            }
            self.saves += 1;
            self.flushed = self.entries.clone();
            self.on_disk = true;
            Ok(())
        }

        fn reload(&mut self) -> Result<(), KeyError> {
            resync(self)
        }
    }

    impl DiskCache for MemoryStore {
        fn on_disk(&self) -> bool {
            self.on_disk
        }

        fn clear_cache(&mut self) {
            self.entries.clear();
        }

        fn merge_from_disk(&mut self) -> Result<(), KeyError> {
            self.entries.extend(self.flushed.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MemoryStore;
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_opens_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(&dir.path().join("store.json")).unwrap();
        assert!(store.get("services").is_none());
    }

    #[test]
    fn test_save_persists_and_reopens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data/store.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set("services", json!([{ "name": "GitHub", "api_keys": [] }]));
        commit(&mut store).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("services").unwrap()[0]["name"], "GitHub");
    }

    #[test]
    fn test_reload_discards_unsaved_changes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, r#"{ "a": 1 }"#).unwrap();

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set("a", json!(2));
        assert!(store.delete("a"));
        store.set("b", json!(3));
        store.reload().unwrap();

        assert_eq!(store.get("a"), Some(json!(1)));
        assert!(store.get("b").is_none());
    }

    #[test]
    fn test_non_object_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(err, KeyError::Persistence(ref m) if m.contains("an array")));
    }

    #[test]
    fn test_failed_commit_rolls_back() {
        let mut store = MemoryStore::seeded(json!({ "k": "old" }));
        store.fail_saves = true;
        store.set("k", json!("new"));

        assert!(commit(&mut store).is_err());
        assert_eq!(store.get("k"), Some(json!("old")));
    }

    #[test]
    fn test_reload_sees_write_from_other_handle() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut gui = JsonFileStore::open(&path).unwrap();
        gui.set("services", json!([{ "name": "OpenAI", "api_keys": [] }]));
        commit(&mut gui).unwrap();

        let mut cli = JsonFileStore::open(&path).unwrap();
        cli.set("api_keys_OpenAI", json!([{ "key": "sk-1", "rate_limit_time": 1 }]));
        commit(&mut cli).unwrap();

        assert!(gui.get("api_keys_OpenAI").is_none());
        gui.reload().unwrap();
        assert_eq!(gui.get("api_keys_OpenAI").unwrap()[0]["key"], "sk-1");
    }

    #[test]
    fn test_reload_before_first_save_empties_cache() {
        let dir = tempdir().unwrap();
        let mut store = JsonFileStore::open(&dir.path().join("store.json")).unwrap();
        store.set("services", json!([]));
        store.reload().unwrap();
        assert!(store.get("services").is_none());
    }

    #[test]
    fn test_failed_commit_drops_entry_new_to_disk() {
        let mut store = MemoryStore::seeded(json!({ "k": "old" }));
        store.fail_saves = true;
        store.set("fresh", json!([1]));

        assert!(commit(&mut store).is_err());
        assert!(store.get("fresh").is_none());
        assert_eq!(store.get("k"), Some(json!("old")));
    }

    #[test]
    fn test_failed_first_commit_leaves_store_empty() {
        let mut store = MemoryStore::default();
        store.fail_saves = true;
        store.set("services", json!([{ "name": "A" }]));

        assert!(commit(&mut store).is_err());
        assert!(store.entries.is_empty());
    }
}

//! Persistent key-value storage
//!
//! A tiny string-to-string store that survives restarts. [`FileStore`] keeps
//! the table as TOML on disk; [`MemoryStore`] keeps it in memory.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Error reading or writing persisted state
#[derive(Debug)]
pub enum StoreError {
    /// I/O error reading or writing the backing file
    Io(std::io::Error),
    /// The backing file is not a table of strings
    Parse(String),
    /// The table could not be serialized
    Serialize(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "IO error: {}", e),
            StoreError::Parse(msg) => write!(f, "Parse error: {}", msg),
            StoreError::Serialize(msg) => write!(f, "Serialize error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

/// String key-value storage
pub trait KeyValueStore {
    /// Read a value, `None` if the key was never written
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a TOML file of string keys
///
/// The file is read on every access, so edits by other processes are seen.
/// A missing file reads as an empty table and is created on first write.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_table(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        toml::from_str(&contents).map_err(|e| StoreError::Parse(e.to_string()))
    }

    fn write_table(&self, table: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let contents =
            toml::to_string(table).map_err(|e| StoreError::Serialize(e.to_string()))?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_table()?.remove(key))
    }

    /// An unparseable file is replaced by a table holding only this key
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut table = match self.read_table() {
            Ok(table) => table,
            Err(StoreError::Parse(msg)) => {
                log::warn!(
                    "Discarding unreadable state file {}: {}",
                    self.path.display(),
                    msg
                );
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        table.insert(key.to_string(), value.to_string());
        self.write_table(&table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("glowfield_store_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap(), Some("1".to_string()));
        store.set("a", "0").unwrap();
        assert_eq!(store.get("a").unwrap(), Some("0".to_string()));
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let store = FileStore::new(temp_path("missing.toml"));
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let path = temp_path("persist.toml");
        let mut store = FileStore::new(&path);
        store.set("ghvst-toggle", "1").unwrap();
        store.set("other", "value").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("ghvst-toggle").unwrap(), Some("1".to_string()));
        assert_eq!(reopened.get("other").unwrap(), Some("value".to_string()));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_file_store_creates_parent_dirs() {
        let dir = std::env::temp_dir().join("glowfield_store_tests").join("nested_parent");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("state.toml");

        let mut store = FileStore::new(&path);
        store.set("k", "v").unwrap();
        assert!(path.exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let path = temp_path("garbage.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(store.get("k"), Err(StoreError::Parse(_))));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_file_store_set_replaces_garbage() {
        let path = temp_path("replace_garbage.toml");
        std::fs::write(&path, "ghvst-toggle = 1\n").unwrap();

        let mut store = FileStore::new(&path);
        assert!(matches!(store.get("ghvst-toggle"), Err(StoreError::Parse(_))));

        store.set("ghvst-toggle", "1").unwrap();
        assert_eq!(store.get("ghvst-toggle").unwrap(), Some("1".to_string()));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Parse("bad".to_string());
        assert_eq!(format!("{}", err), "Parse error: bad");
    }
}

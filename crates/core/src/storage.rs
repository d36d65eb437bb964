//! Durable key-value storage.
//!
//! The conversation store persists one JSON snapshot under a single key and
//! treats the backend as synchronous and always-available; any embedding
//! (file, database, in-memory for tests) satisfies the trait.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A durable key-value store.
pub trait Storage {
    /// Get the value for a key.
    fn get(&self, key: &str) -> Option<String>;

    /// Set (upsert) a key-value pair.
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory store backed by a `BTreeMap`.
///
/// Useful for tests and as a scratch backend.
#[derive(Clone, Default, Debug)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_owned(), value.to_owned());
    }
}

/// File-backed store: one file per key under a root directory.
///
/// Writes go through a temp file and an atomic rename, so a snapshot is
/// never observable half-written. The trait has no failure channel; I/O
/// errors are logged and the previous value stays in place.
#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created on first
    /// write if it does not exist.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl Storage for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Err(e) = write_atomic(&self.path_for(key), value) {
            tracing::error!("failed to persist '{key}': {e}");
        }
    }
}

fn write_atomic(path: &Path, value: &str) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let mut tmp = path.to_path_buf();
    let file = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "snapshot".to_string());
    tmp.set_file_name(format!("{file}.tmp"));

    std::fs::write(&tmp, value)?;
    std::fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_set_and_get() {
        let mut store = MemoryStore::new();
        assert!(store.get("history").is_none());

        store.set("history", "{}");
        assert_eq!(store.get("history").unwrap(), "{}");

        store.set("history", "{\"a\":1}");
        assert_eq!(store.get("history").unwrap(), "{\"a\":1}");
    }

    #[test]
    fn file_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());

        assert!(store.get(".chat_history").is_none());
        store.set(".chat_history", "{\"chats\":{}}");
        assert_eq!(store.get(".chat_history").unwrap(), "{\"chats\":{}}");

        // A second store over the same root sees the data.
        let other = FileStore::new(dir.path());
        assert_eq!(other.get(".chat_history").unwrap(), "{\"chats\":{}}");
    }

    #[test]
    fn file_store_overwrite_replaces_whole_value() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());

        store.set("k", "long initial value");
        store.set("k", "short");
        assert_eq!(store.get("k").unwrap(), "short");
    }
}

//! Local session persistence.
//!
//! Sessions are stored as scene JSON keyed by the scene's file name. Store
//! failures are never fatal to rendering; callers log them and carry on.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sharevol_core::{Result, ViewerError};

/// Persists serialized scenes between runs.
pub trait SessionStore {
    /// Returns the stored scene for `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::Storage`] when the store cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Stores `scene` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::Storage`] when the write fails.
    fn save(&mut self, key: &str, scene: &str) -> Result<()>;

    /// Forgets `key`. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::Storage`] when the entry cannot be removed.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

fn storage(err: &std::io::Error, path: &Path) -> ViewerError {
    ViewerError::Storage(format!("{}: {err}", path.display()))
}

impl SessionStore for FileSessionStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage(&e, &path)),
        }
    }

    fn save(&mut self, key: &str, scene: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| storage(&e, &self.dir))?;
        let path = self.path(key);
        std::fs::write(&path, scene).map_err(|e| storage(&e, &path))?;
        log::debug!("stored session '{key}' at {}", path.display());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage(&e, &path)),
        }
    }
}

/// Sessions held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    entries: HashMap<String, String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, scene: &str) -> Result<()> {
        self.entries.insert(key.to_owned(), scene.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip() {
        let dir = std::env::temp_dir().join(format!("sharevol-store-{}", std::process::id()));
        let mut store = FileSessionStore::new(&dir);
        assert_eq!(store.load("scan/head.json").unwrap(), None);

        store.save("scan/head.json", "{}").unwrap();
        assert_eq!(store.load("scan/head.json").unwrap().as_deref(), Some("{}"));
        assert!(store.dir().join("scan_head.json.json").is_file());

        store.remove("scan/head.json").unwrap();
        store.remove("scan/head.json").unwrap();
        assert_eq!(store.load("scan/head.json").unwrap(), None);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemorySessionStore::new();
        store.save("a", "1").unwrap();
        store.save("a", "2").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.load("a").unwrap().as_deref(), Some("2"));
        store.remove("a").unwrap();
        assert!(store.is_empty());
    }
}

//! Where atlas images come from.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sharevol_core::{Result, ViewerError};

/// Fetches atlas image bytes by URL.
///
/// Fetches are not retried; a failure leaves the caller without an atlas.
pub trait AtlasSource {
    /// Returns the encoded image at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::Fetch`] when the resource cannot be read.
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Reads atlases from a directory.
///
/// A URL is resolved against the base directory as-is, then with `.png`
/// and `.jpg` appended, since tiered atlas URLs carry no extension.
#[derive(Debug, Clone)]
pub struct FileAtlasSource {
    base: PathBuf,
}

impl FileAtlasSource {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn candidates(&self, url: &str) -> [PathBuf; 3] {
        let path = self.base.join(url.trim_start_matches('/'));
        [
            path.clone(),
            PathBuf::from(format!("{}.png", path.display())),
            PathBuf::from(format!("{}.jpg", path.display())),
        ]
    }
}

impl AtlasSource for FileAtlasSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        for path in self.candidates(url) {
            if path.is_file() {
                log::info!("reading atlas {}", path.display());
                return std::fs::read(&path).map_err(|e| ViewerError::Fetch {
                    url: url.to_owned(),
                    reason: e.to_string(),
                });
            }
        }
        Err(ViewerError::Fetch {
            url: url.to_owned(),
            reason: format!("not found under {}", self.base.display()),
        })
    }
}

/// In-memory atlases keyed by URL.
#[derive(Debug, Clone, Default)]
pub struct MemoryAtlasSource {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryAtlasSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an atlas, returning `self` for chaining.
    #[must_use]
    pub fn with(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(url, bytes);
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(url.into(), bytes);
    }
}

impl AtlasSource for MemoryAtlasSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.entries.get(url).cloned().ok_or_else(|| ViewerError::Fetch {
            url: url.to_owned(),
            reason: "no such entry".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharevol_core::ErrorKind;

    #[test]
    fn test_file_source_tries_extensions() {
        let dir = std::env::temp_dir().join(format!("sharevol-source-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("head-l.png"), b"png bytes").unwrap();

        let source = FileAtlasSource::new(&dir);
        assert_eq!(source.fetch("head-l").unwrap(), b"png bytes");
        assert_eq!(source.fetch("/head-l.png").unwrap(), b"png bytes");

        let err = source.fetch("head-s").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_memory_source() {
        let source = MemoryAtlasSource::new().with("a-l", vec![1, 2, 3]);
        assert_eq!(source.fetch("a-l").unwrap(), vec![1, 2, 3]);
        assert!(matches!(source.fetch("a-m"), Err(ViewerError::Fetch { .. })));
    }
}

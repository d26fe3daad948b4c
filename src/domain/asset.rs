//! Resolved-asset cache records.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Opaque reference to a payload bundled with the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceHandle(u32);

impl ResourceHandle {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Cache record for one catalog entry
///
/// `shareable_path` is only meaningful while `is_loaded` is true.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAsset {
    /// Catalog entry id
    pub entry_id: String,

    /// Local location usable by the share surface
    pub shareable_path: Option<PathBuf>,

    /// Size in bytes (if known)
    pub size_bytes: Option<u64>,

    pub is_loaded: bool,
}

impl ResolvedAsset {
    /// Fresh, unloaded record
    pub fn unloaded(entry_id: impl Into<String>) -> Self {
        Self {
            entry_id: entry_id.into(),
            ..Default::default()
        }
    }

    /// The cached path, if the record is loaded
    pub fn cached_path(&self) -> Option<&PathBuf> {
        if self.is_loaded {
            self.shareable_path.as_ref()
        } else {
            None
        }
    }

    /// Mark loaded with a resolved location
    pub fn load(&mut self, path: PathBuf, size_bytes: Option<u64>) {
        self.shareable_path = Some(path);
        self.size_bytes = size_bytes;
        self.is_loaded = true;
    }

    /// Drop the cached location
    pub fn invalidate(&mut self) {
        self.shareable_path = None;
        self.size_bytes = None;
        self.is_loaded = false;
    }
}

/// Snapshot counts for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total: usize,
    pub loaded: usize,
    pub cached_uri_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_and_invalidate() {
        let mut asset = ResolvedAsset::unloaded("rain");
        assert!(asset.cached_path().is_none());

        asset.load(PathBuf::from("/cache/rain.wav"), Some(42));
        assert_eq!(asset.cached_path(), Some(&PathBuf::from("/cache/rain.wav")));
        assert_eq!(asset.size_bytes, Some(42));

        asset.invalidate();
        assert!(!asset.is_loaded);
        assert!(asset.shareable_path.is_none());
        assert!(asset.size_bytes.is_none());
    }

    #[test]
    fn test_stale_path_is_not_trusted() {
        let asset = ResolvedAsset {
            entry_id: "rain".into(),
            shareable_path: Some(PathBuf::from("/cache/rain.wav")),
            size_bytes: None,
            is_loaded: false,
        };
        assert!(asset.cached_path().is_none());
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(ResourceHandle::new(7).to_string(), "#7");
    }
}

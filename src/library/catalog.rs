//! Catalog of bundled audio clips.
//!
//! Loaded once at startup from a YAML manifest and never mutated afterwards.
//!
//! ```yaml
//! version: 1
//! clips:
//!   - filename: doorbell.mp3
//!     title: Doorbell
//!     description: Two-tone chime
//!     author: Studio
//!     category: Effects
//!     tags: [short, chime]
//!     estimated_duration: 3
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::warn;

/// Raw manifest file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
struct ManifestFile {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    clips: Vec<ManifestItem>,
}

fn default_version() -> u32 {
    1
}

/// A clip as written in the manifest
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestItem {
    pub filename: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Estimated duration in seconds
    #[serde(default)]
    pub estimated_duration: Option<u32>,
}

/// Ordered list of audio clips
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Manifest format version
    pub version: u32,

    /// Entries in manifest order
    pub entries: Vec<CatalogEntry>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self {
            version: 1,
            entries: Vec::new(),
        }
    }

    /// Build a catalog from already-constructed entries
    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let mut catalog = Self::new();
        for entry in entries {
            catalog.add(entry);
        }
        catalog
    }

    /// Parse a YAML manifest
    pub fn from_manifest_str(content: &str) -> Result<Self> {
        let manifest: ManifestFile =
            serde_yaml::from_str(content).context("Failed to parse catalog manifest")?;

        let mut catalog = Self::new();
        catalog.version = manifest.version;
        for item in manifest.clips {
            catalog.add(CatalogEntry::from(item));
        }

        Ok(catalog)
    }

    /// Load the catalog manifest from disk
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read catalog manifest: {}", path.display()))?;

        Self::from_manifest_str(&content)
            .with_context(|| format!("Invalid catalog manifest: {}", path.display()))
    }

    /// Add an entry, replacing and returning any existing entry with the same id
    pub fn add(&mut self, entry: CatalogEntry) -> Option<CatalogEntry> {
        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => {
                warn!(
                    id = %entry.id,
                    replaced = %existing.filename,
                    by = %entry.filename,
                    "Catalog id collision, keeping the later entry"
                );
                Some(std::mem::replace(existing, entry))
            }
            None => {
                self.entries.push(entry);
                None
            }
        }
    }

    /// Get an entry by id
    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Get an entry by its bundled filename
    pub fn get_by_filename(&self, filename: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.filename == filename)
    }

    /// Search entries by query (case-insensitive substring match)
    pub fn search(&self, query: &str) -> Vec<&CatalogEntry> {
        let query_lower = query.to_lowercase();

        self.entries
            .iter()
            .filter(|entry| {
                entry.title.to_lowercase().contains(&query_lower)
                    || entry.author.to_lowercase().contains(&query_lower)
                    || entry
                        .tags
                        .iter()
                        .any(|t| t.to_lowercase().contains(&query_lower))
            })
            .collect()
    }

    /// Filter entries by category (case-insensitive)
    pub fn filter_by_category(&self, category: &str) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.category.eq_ignore_ascii_case(category))
            .collect()
    }

    /// Iterate entries in manifest order
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A single audio clip in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Unique identifier (filename without extension)
    pub id: String,

    /// Bundled filename, also the key of its bundled resource
    pub filename: String,

    /// Human-readable title
    pub title: String,

    pub description: String,

    pub author: String,

    pub category: String,

    #[serde(default)]
    pub tags: BTreeSet<String>,

    /// Estimated duration in seconds
    pub estimated_duration_seconds: Option<u32>,
}

impl CatalogEntry {
    /// Create a new entry; the id is derived from the filename
    pub fn new(filename: impl Into<String>, title: impl Into<String>) -> Self {
        let filename = filename.into();
        let id = entry_id_for(&filename);

        Self {
            id,
            filename,
            title: title.into(),
            description: String::new(),
            author: String::new(),
            category: String::new(),
            tags: BTreeSet::new(),
            estimated_duration_seconds: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.estimated_duration_seconds = Some(seconds);
        self
    }
}

impl From<ManifestItem> for CatalogEntry {
    fn from(item: ManifestItem) -> Self {
        Self {
            id: entry_id_for(&item.filename),
            filename: item.filename,
            title: item.title,
            description: item.description,
            author: item.author,
            category: item.category,
            tags: item.tags.into_iter().collect(),
            estimated_duration_seconds: item.estimated_duration,
        }
    }
}

/// Derive an entry id from a filename by dropping the extension
pub fn entry_id_for(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
        .to_string()
}

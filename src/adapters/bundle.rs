//! Bundled audio payloads and the filename -> handle registry.
//!
//! Every catalog filename that ships with the application gets exactly one
//! opaque `ResourceHandle`. Catalog entries without a registered payload are
//! simply absent here; the resolver reports them when it initializes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::domain::ResourceHandle;
use crate::library::Catalog;

use super::{BundledResource, LocalAsset, RemoteResource};

/// A payload shipped as a file in the assets directory
///
/// Downloading copies it into the cache directory, mirroring how a packaged
/// asset is unpacked before the host can hand it to other applications.
pub struct BundledFile {
    source: PathBuf,
    cache_dir: PathBuf,
}

impl BundledFile {
    pub fn new(source: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            cache_dir: cache_dir.into(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

#[async_trait]
impl BundledResource for BundledFile {
    fn describe(&self) -> String {
        format!("bundled file {}", self.source.display())
    }

    async fn download(&self) -> Result<LocalAsset> {
        let file_name = self
            .source
            .file_name()
            .with_context(|| format!("Bundled path has no file name: {}", self.source.display()))?;

        fs::create_dir_all(&self.cache_dir).await.with_context(|| {
            format!("Failed to create cache directory: {}", self.cache_dir.display())
        })?;

        let destination = self.cache_dir.join(file_name);
        let size = fs::copy(&self.source, &destination).await.with_context(|| {
            format!(
                "Failed to unpack {} into {}",
                self.source.display(),
                destination.display()
            )
        })?;

        debug!(source = %self.source.display(), size, "Unpacked bundled file");
        Ok(LocalAsset::new(destination, Some(size)))
    }
}

/// Registry of bundled payloads keyed by catalog filename
#[derive(Default)]
pub struct AssetBundle {
    resources: HashMap<String, (ResourceHandle, Arc<dyn BundledResource>)>,
    next_handle: u32,
}

impl AssetBundle {
    /// Create an empty bundle
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the payload for a filename
    ///
    /// Re-registering a filename swaps the payload but keeps its handle.
    pub fn register(
        &mut self,
        filename: impl Into<String>,
        resource: Arc<dyn BundledResource>,
    ) -> ResourceHandle {
        let filename = filename.into();

        if let Some((handle, existing)) = self.resources.get_mut(&filename) {
            *existing = resource;
            return *handle;
        }

        self.next_handle += 1;
        let handle = ResourceHandle::new(self.next_handle);
        self.resources.insert(filename, (handle, resource));
        handle
    }

    /// Build a bundle for a catalog from an assets directory
    ///
    /// Files present under `assets_dir` are registered as `BundledFile`s.
    /// When `remote_base_url` is set, filenames missing locally are fetched
    /// from `<remote_base_url>/<filename>` instead.
    pub fn from_directory(
        catalog: &Catalog,
        assets_dir: &Path,
        cache_dir: &Path,
        remote_base_url: Option<&str>,
    ) -> Self {
        let mut bundle = Self::new();

        for entry in catalog.iter() {
            let source = assets_dir.join(&entry.filename);

            if source.is_file() {
                bundle.register(
                    entry.filename.clone(),
                    Arc::new(BundledFile::new(source, cache_dir)),
                );
            } else if let Some(base) = remote_base_url {
                let url = format!("{}/{}", base.trim_end_matches('/'), entry.filename);
                bundle.register(
                    entry.filename.clone(),
                    Arc::new(RemoteResource::new(url, cache_dir, entry.filename.clone())),
                );
            }
        }

        bundle
    }

    pub fn handle_for(&self, filename: &str) -> Option<ResourceHandle> {
        self.resources.get(filename).map(|(handle, _)| *handle)
    }

    pub fn resource(&self, filename: &str) -> Option<Arc<dyn BundledResource>> {
        self.resources
            .get(filename)
            .map(|(_, resource)| Arc::clone(resource))
    }

    pub fn filename_for(&self, handle: ResourceHandle) -> Option<&str> {
        self.resources
            .iter()
            .find(|(_, (h, _))| *h == handle)
            .map(|(filename, _)| filename.as_str())
    }

    /// Check every catalog entry for a registered payload
    pub fn validate(&self, catalog: &Catalog) -> Vec<AssetCheck> {
        catalog
            .iter()
            .map(|entry| match self.resources.get(&entry.filename) {
                Some((handle, resource)) => AssetCheck {
                    filename: entry.filename.clone(),
                    title: entry.title.clone(),
                    status: AssetStatus::Available {
                        handle: *handle,
                        source: resource.describe(),
                    },
                },
                None => AssetCheck {
                    filename: entry.filename.clone(),
                    title: entry.title.clone(),
                    status: AssetStatus::Missing,
                },
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Result of checking one catalog entry against the bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetCheck {
    pub filename: String,
    pub title: String,
    pub status: AssetStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetStatus {
    Available {
        handle: ResourceHandle,
        source: String,
    },
    Missing,
}

impl AssetCheck {
    pub fn is_available(&self) -> bool {
        matches!(self.status, AssetStatus::Available { .. })
    }
}

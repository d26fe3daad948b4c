//! Asset resolver: bundled payload -> shareable local path, memoized per entry.
//!
//! The table of entries is built once by `initialize`. Each entry carries its
//! own lock, held for the whole fetch, so concurrent first requests for the
//! same id share a single download while different ids resolve in parallel.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use thiserror::Error;
use tokio::sync::{Mutex, OnceCell};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::adapters::{AssetBundle, BundledResource};
use crate::domain::{CacheStats, ResolvedAsset, ResourceHandle};
use crate::library::{Catalog, CatalogEntry};

use super::debug_log::DebugLog;

/// Resolution failures
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error("Asset resolver has not been initialized")]
    NotInitialized,

    #[error("No asset mapping found for '{0}'")]
    AssetNotFound(String),

    #[error("Failed to resolve '{id}': {reason}")]
    ResolutionFailed { id: String, reason: String },
}

/// Where the resolver reads its catalog from
#[derive(Debug, Clone)]
pub enum CatalogSource {
    /// Already-loaded catalog
    Inline(Catalog),

    /// YAML manifest on disk
    File(PathBuf),
}

impl CatalogSource {
    pub async fn load(&self) -> Result<Catalog> {
        match self {
            CatalogSource::Inline(catalog) => Ok(catalog.clone()),
            CatalogSource::File(path) => Catalog::load(path).await,
        }
    }
}

/// One resolvable entry and its cache record
struct AssetSlot {
    entry: CatalogEntry,
    handle: ResourceHandle,
    resource: Arc<dyn BundledResource>,
    state: Mutex<ResolvedAsset>,
}

struct ResolverTable {
    slots: HashMap<String, Arc<AssetSlot>>,
    /// Ids in catalog order
    order: Vec<String>,
}

/// Resolves catalog entries to shareable local paths
pub struct AssetResolver {
    source: CatalogSource,
    bundle: Arc<AssetBundle>,
    log: Arc<DebugLog>,
    table: OnceCell<ResolverTable>,
}

impl AssetResolver {
    pub fn new(source: CatalogSource, bundle: Arc<AssetBundle>, log: Arc<DebugLog>) -> Self {
        Self {
            source,
            bundle,
            log,
            table: OnceCell::new(),
        }
    }

    /// Build the entry table from the catalog
    ///
    /// Entries without a bundled resource are skipped with a warning. Calling
    /// this again after a success does nothing.
    pub async fn initialize(&self) -> Result<()> {
        if self.table.initialized() {
            debug!("Asset resolver already initialized");
            return Ok(());
        }

        self.table
            .get_or_try_init(|| self.build_table())
            .await
            .context("Failed to initialize asset resolver")?;

        Ok(())
    }

    async fn build_table(&self) -> Result<ResolverTable> {
        let catalog = self.source.load().await?;

        let mut slots = HashMap::new();
        let mut order = Vec::new();

        for entry in catalog.iter() {
            let registered = self
                .bundle
                .handle_for(&entry.filename)
                .zip(self.bundle.resource(&entry.filename));

            let Some((handle, resource)) = registered else {
                warn!(filename = %entry.filename, "No bundled resource registered, skipping");
                self.log.log(format!("No bundled resource found for: {}", entry.filename));
                continue;
            };

            order.push(entry.id.clone());
            slots.insert(
                entry.id.clone(),
                Arc::new(AssetSlot {
                    entry: entry.clone(),
                    handle,
                    resource,
                    state: Mutex::new(ResolvedAsset::unloaded(entry.id.clone())),
                }),
            );
        }

        info!(mappings = slots.len(), "Asset resolver initialized");
        self.log.log(format!(
            "Asset resolver initialized with {} mappings",
            slots.len()
        ));

        Ok(ResolverTable { slots, order })
    }

    fn table(&self) -> Result<&ResolverTable, ResolveError> {
        self.table.get().ok_or(ResolveError::NotInitialized)
    }

    fn slot(&self, id: &str) -> Result<&Arc<AssetSlot>, ResolveError> {
        self.table()?
            .slots
            .get(id)
            .ok_or_else(|| ResolveError::AssetNotFound(id.to_string()))
    }

    /// Shareable path for an entry, fetching it on first use
    #[instrument(skip(self))]
    pub async fn resolve(&self, id: &str) -> Result<PathBuf, ResolveError> {
        let asset = self.resolve_asset(id).await?;
        asset.shareable_path.ok_or_else(|| ResolveError::ResolutionFailed {
            id: id.to_string(),
            reason: "no local path produced".to_string(),
        })
    }

    /// Resolve an entry and return its loaded cache record
    pub async fn resolve_asset(&self, id: &str) -> Result<ResolvedAsset, ResolveError> {
        let slot = match self.slot(id) {
            Ok(slot) => slot,
            Err(e) => {
                self.log.log(format!("Cannot resolve '{}': {}", id, e));
                return Err(e);
            }
        };
        resolve_slot(slot, &self.log).await
    }

    /// Resolve the entry owning a bundled handle
    pub async fn resolve_handle(
        &self,
        handle: ResourceHandle,
    ) -> Result<ResolvedAsset, ResolveError> {
        let id = self.entry_for_handle(handle)?.id.clone();
        self.resolve_asset(&id).await
    }

    /// Catalog entry registered under a handle
    pub fn entry_for_handle(&self, handle: ResourceHandle) -> Result<&CatalogEntry, ResolveError> {
        self.table()?
            .slots
            .values()
            .find(|slot| slot.handle == handle)
            .map(|slot| &slot.entry)
            .ok_or_else(|| ResolveError::AssetNotFound(format!("bundled resource {}", handle)))
    }

    pub fn entry(&self, id: &str) -> Option<&CatalogEntry> {
        self.slot(id).ok().map(|slot| &slot.entry)
    }

    pub fn handle_for(&self, id: &str) -> Option<ResourceHandle> {
        self.slot(id).ok().map(|slot| slot.handle)
    }

    /// Resolvable entries in catalog order
    pub fn entries(&self) -> Vec<&CatalogEntry> {
        match self.table() {
            Ok(table) => table
                .order
                .iter()
                .filter_map(|id| table.slots.get(id))
                .map(|slot| &slot.entry)
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Snapshot of one entry's cache record
    pub async fn asset_info(&self, id: &str) -> Option<ResolvedAsset> {
        let slot = self.slot(id).ok()?;
        let state = slot.state.lock().await;
        Some(state.clone())
    }

    /// Whether an entry is loaded and can be shared without I/O
    pub async fn is_ready(&self, id: &str) -> bool {
        self.asset_info(id)
            .await
            .map(|asset| asset.cached_path().is_some())
            .unwrap_or(false)
    }

    /// Resolve every entry concurrently
    ///
    /// Individual failures are logged and otherwise ignored; the only error is
    /// calling this before `initialize`.
    pub async fn preload_all(&self) -> Result<(), ResolveError> {
        let table = self.table()?;
        self.log.log("Preloading all assets...");

        let mut join_set = JoinSet::new();
        for id in &table.order {
            let Some(slot) = table.slots.get(id) else {
                continue;
            };
            let slot = Arc::clone(slot);
            let log = Arc::clone(&self.log);

            join_set.spawn(async move {
                let result = resolve_slot(&slot, &log).await;
                (slot.entry.id.clone(), result)
            });
        }

        let mut loaded = 0usize;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((_, Ok(_))) => loaded += 1,
                Ok((id, Err(e))) => {
                    warn!(%id, error = %e, "Failed to preload asset");
                }
                Err(e) => {
                    warn!(error = %e, "Preload task did not complete");
                    self.log.log(format!("Preload task did not complete: {}", e));
                }
            }
        }

        info!(loaded, total = table.order.len(), "Preload finished");
        self.log.log(format!(
            "Preloaded {} of {} assets",
            loaded,
            table.order.len()
        ));

        Ok(())
    }

    /// Forget the resolved path of the entry owning `handle`
    ///
    /// The next request for it fetches the payload again.
    pub async fn invalidate_handle(&self, handle: ResourceHandle) {
        let Ok(table) = self.table() else {
            return;
        };

        if let Some(slot) = table.slots.values().find(|slot| slot.handle == handle) {
            slot.state.lock().await.invalidate();
            debug!(id = %slot.entry.id, "Resolved asset invalidated");
            self.log.log(format!("Cached path dropped for: {}", slot.entry.title));
        }
    }

    /// Forget every resolved path; the catalog is untouched
    pub async fn clear_cache(&self) {
        let Ok(table) = self.table() else {
            return;
        };

        for slot in table.slots.values() {
            slot.state.lock().await.invalidate();
        }

        self.log.log("Asset resolver cache cleared");
    }

    pub async fn stats(&self) -> CacheStats {
        let Ok(table) = self.table() else {
            return CacheStats::default();
        };

        let mut stats = CacheStats {
            total: table.slots.len(),
            ..Default::default()
        };

        for slot in table.slots.values() {
            let state = slot.state.lock().await;
            if state.is_loaded {
                stats.loaded += 1;
            }
            if state.shareable_path.is_some() {
                stats.cached_uri_count += 1;
            }
        }

        stats
    }
}

/// Return the cached record or fetch it while holding the entry's lock
async fn resolve_slot(slot: &AssetSlot, log: &DebugLog) -> Result<ResolvedAsset, ResolveError> {
    let mut state = slot.state.lock().await;

    if state.cached_path().is_some() {
        debug!(id = %slot.entry.id, "Reusing cached asset");
        log.log(format!("Reusing cached path for: {}", slot.entry.title));
        return Ok(state.clone());
    }

    log.log(format!("Loading asset for: {}", slot.entry.title));

    let local = match slot.resource.download().await {
        Ok(local) => local,
        Err(e) => {
            let error = ResolveError::ResolutionFailed {
                id: slot.entry.id.clone(),
                reason: format!("{:#}", e),
            };
            log.log(format!("Failed to load {}: {}", slot.entry.title, error));
            return Err(error);
        }
    };

    if local.path.as_os_str().is_empty() {
        let error = ResolveError::ResolutionFailed {
            id: slot.entry.id.clone(),
            reason: "no local path produced".to_string(),
        };
        log.log(format!("Failed to load {}: {}", slot.entry.title, error));
        return Err(error);
    }

    log.log(format!(
        "Asset loaded: {} -> {}",
        slot.entry.title,
        local.path.display()
    ));
    state.load(local.path, local.size_bytes);

    Ok(state.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::BundledFile;
    use tempfile::TempDir;

    fn resolver_with_file(temp: &TempDir) -> AssetResolver {
        let source = temp.path().join("rain.wav");
        std::fs::write(&source, b"RIFF....WAVE").unwrap();

        let mut bundle = AssetBundle::new();
        bundle.register(
            "rain.wav",
            Arc::new(BundledFile::new(source, temp.path().join("cache"))),
        );

        let catalog = Catalog::from_entries([
            CatalogEntry::new("rain.wav", "Rain"),
            CatalogEntry::new("orphan.mp3", "Orphan"),
        ]);

        AssetResolver::new(
            CatalogSource::Inline(catalog),
            Arc::new(bundle),
            Arc::new(DebugLog::new(temp.path().join("debug.log"))),
        )
    }

    #[tokio::test]
    async fn test_resolve_before_initialize() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver_with_file(&temp);

        let result = resolver.resolve("rain").await;
        assert!(matches!(result, Err(ResolveError::NotInitialized)));
        assert_eq!(resolver.stats().await, CacheStats::default());
    }

    #[tokio::test]
    async fn test_unregistered_entries_are_skipped() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver_with_file(&temp);
        resolver.initialize().await.unwrap();

        assert_eq!(resolver.stats().await.total, 1);
        assert!(resolver.entry("orphan").is_none());
        assert!(matches!(
            resolver.resolve("orphan").await,
            Err(ResolveError::AssetNotFound(_))
        ));
        assert!(resolver
            .log
            .get_all()
            .iter()
            .any(|e| e.message.contains("orphan.mp3")));
    }

    #[tokio::test]
    async fn test_resolve_with_bundled_file() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver_with_file(&temp);
        resolver.initialize().await.unwrap();

        let path = resolver.resolve("rain").await.unwrap();
        assert_eq!(path, temp.path().join("cache").join("rain.wav"));
        assert!(resolver.is_ready("rain").await);

        let info = resolver.asset_info("rain").await.unwrap();
        assert_eq!(info.size_bytes, Some(12));
    }

    #[tokio::test]
    async fn test_handle_lookup() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver_with_file(&temp);
        resolver.initialize().await.unwrap();

        let handle = resolver.handle_for("rain").unwrap();
        assert_eq!(resolver.entry_for_handle(handle).unwrap().id, "rain");
        assert!(resolver.entry_for_handle(ResourceHandle::new(999)).is_err());

        let asset = resolver.resolve_handle(handle).await.unwrap();
        assert!(asset.is_loaded);
    }

    #[tokio::test]
    async fn test_invalidate_single_handle() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver_with_file(&temp);
        resolver.initialize().await.unwrap();

        let handle = resolver.handle_for("rain").unwrap();
        resolver.resolve("rain").await.unwrap();
        assert!(resolver.is_ready("rain").await);

        resolver.invalidate_handle(handle).await;
        assert!(!resolver.is_ready("rain").await);
        assert_eq!(resolver.stats().await.total, 1);

        // Unknown handles are ignored
        resolver.invalidate_handle(ResourceHandle::new(999)).await;
        assert!(resolver.resolve("rain").await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_manifest_is_fatal() {
        let temp = TempDir::new().unwrap();
        let resolver = AssetResolver::new(
            CatalogSource::File(temp.path().join("missing.yaml")),
            Arc::new(AssetBundle::new()),
            Arc::new(DebugLog::new(temp.path().join("debug.log"))),
        );

        assert!(resolver.initialize().await.is_err());
        assert!(matches!(
            resolver.resolve("anything").await,
            Err(ResolveError::NotInitialized)
        ));
    }
}

//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use tempfile::TempDir;

use clipshare::adapters::{
    AssetBundle, BundledResource, LocalAsset, LocalFileSystem, SharePayload, ShareOptions,
    SharePlatform,
};
use clipshare::core::{AssetResolver, CatalogSource, DebugLog, ShareOrchestrator};
use clipshare::library::{Catalog, CatalogEntry};

/// Bundled resource that counts its downloads
pub struct CountingResource {
    path: PathBuf,
    downloads: AtomicUsize,
    fail: bool,
    delay: Duration,
}

impl CountingResource {
    /// Resource backed by a real file with `contents`
    pub fn new(path: impl Into<PathBuf>, contents: &[u8]) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        Self {
            path,
            downloads: AtomicUsize::new(0),
            fail: false,
            delay: Duration::ZERO,
        }
    }

    /// Resource whose download always fails
    pub fn failing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            downloads: AtomicUsize::new(0),
            fail: true,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BundledResource for CountingResource {
    fn describe(&self) -> String {
        format!("counting {}", self.path.display())
    }

    async fn download(&self) -> Result<LocalAsset> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            bail!("bundle payload unavailable");
        }
        let size = std::fs::metadata(&self.path)?.len();
        Ok(LocalAsset::new(&self.path, Some(size)))
    }
}

/// Share surface that records calls and fails on demand
#[derive(Default)]
pub struct ScriptedPlatform {
    pub unavailable: bool,
    pub fail_files: bool,
    pub fail_urls: bool,
    pub fail_text: bool,
    /// Fail only the first file share
    pub fail_first_file: bool,
    pub calls: Mutex<Vec<(SharePayload, ShareOptions)>>,
}

impl ScriptedPlatform {
    pub fn calls(&self) -> Vec<(SharePayload, ShareOptions)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SharePlatform for ScriptedPlatform {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn is_available(&self) -> bool {
        !self.unavailable
    }

    async fn share(&self, payload: &SharePayload, options: &ShareOptions) -> Result<()> {
        let mut calls = self.calls.lock().unwrap();
        let earlier_files = calls
            .iter()
            .filter(|(p, _)| matches!(p, SharePayload::File(_)))
            .count();
        calls.push((payload.clone(), options.clone()));

        match payload {
            SharePayload::File(_) if self.fail_files => bail!("file sharing rejected"),
            SharePayload::File(_) if self.fail_first_file && earlier_files == 0 => {
                bail!("content URI not accepted")
            }
            SharePayload::Url(_) if self.fail_urls => bail!("url sharing rejected"),
            SharePayload::Text(_) if self.fail_text => bail!("text sharing rejected"),
            _ => Ok(()),
        }
    }
}

/// Resolver and orchestrator wired over a temp directory
pub struct Harness {
    pub temp: TempDir,
    pub log: Arc<DebugLog>,
    pub resolver: Arc<AssetResolver>,
    pub platform: Arc<ScriptedPlatform>,
    pub orchestrator: ShareOrchestrator,
}

impl Harness {
    /// Build a harness from catalog entries and their bundled resources
    pub fn new(
        temp: TempDir,
        entries: Vec<CatalogEntry>,
        resources: Vec<(&str, Arc<dyn BundledResource>)>,
        platform: ScriptedPlatform,
    ) -> Self {
        let mut bundle = AssetBundle::new();
        for (filename, resource) in resources {
            bundle.register(filename, resource);
        }

        let log = Arc::new(DebugLog::new(temp.path().join("shared").join("debug.log")));
        let resolver = Arc::new(AssetResolver::new(
            CatalogSource::Inline(Catalog::from_entries(entries)),
            Arc::new(bundle),
            Arc::clone(&log),
        ));
        let platform = Arc::new(platform);
        let orchestrator = ShareOrchestrator::new(
            Arc::clone(&resolver),
            Arc::new(LocalFileSystem::new(temp.path().join("shared"))),
            platform.clone(),
            Arc::clone(&log),
        );

        Self {
            temp,
            log,
            resolver,
            platform,
            orchestrator,
        }
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn log_contains(&self, needle: &str) -> bool {
        self.log.get_all().iter().any(|e| e.message.contains(needle))
    }
}

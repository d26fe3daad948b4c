//! Adapter interfaces for host capabilities.
//!
//! The core only talks to the outside world through these traits:
//! - `BundledResource`: an audio payload shipped with the application
//! - `FileSystem`: file access rooted at a private writable directory
//! - `SharePlatform`: the operating system's share surface

pub mod bundle;
pub mod filesystem;
pub mod remote;
pub mod share;

use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;

pub use bundle::{AssetBundle, AssetCheck, AssetStatus, BundledFile};
pub use filesystem::LocalFileSystem;
pub use remote::RemoteResource;
pub use share::CommandShare;

/// A bundled resource materialized on the local filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAsset {
    /// Location usable by the share surface
    pub path: PathBuf,

    /// Size in bytes (if known)
    pub size_bytes: Option<u64>,
}

impl LocalAsset {
    pub fn new(path: impl Into<PathBuf>, size_bytes: Option<u64>) -> Self {
        Self {
            path: path.into(),
            size_bytes,
        }
    }
}

/// An audio payload packaged with the application
#[async_trait]
pub trait BundledResource: Send + Sync {
    /// Human-readable description of where the payload comes from
    fn describe(&self) -> String;

    /// Materialize the payload locally
    async fn download(&self) -> Result<LocalAsset>;
}

/// Filesystem access used by the share pipeline
#[async_trait]
pub trait FileSystem: Send + Sync {
    async fn exists(&self, path: &Path) -> bool;

    /// Size of a file in bytes
    async fn size(&self, path: &Path) -> Result<u64>;

    /// Copy a file, returning the number of bytes copied
    async fn copy(&self, from: &Path, to: &Path) -> Result<u64>;

    async fn write(&self, path: &Path, contents: &str) -> Result<()>;

    async fn read(&self, path: &Path) -> Result<String>;

    async fn delete(&self, path: &Path) -> Result<()>;

    /// Well-known private writable directory
    fn private_dir(&self) -> &Path;
}

/// What is handed to the share surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SharePayload {
    File(PathBuf),
    Url(String),
    Text(String),
}

impl std::fmt::Display for SharePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SharePayload::File(path) => write!(f, "file {}", path.display()),
            SharePayload::Url(url) => write!(f, "url {}", url),
            SharePayload::Text(text) => write!(f, "text ({} chars)", text.chars().count()),
        }
    }
}

/// Presentation options for a share
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareOptions {
    pub mime_type: String,
    pub dialog_title: String,
}

impl ShareOptions {
    pub fn new(mime_type: impl Into<String>, title: &str) -> Self {
        Self {
            mime_type: mime_type.into(),
            dialog_title: format!("Share {}", title),
        }
    }
}

/// The operating system's native share surface
///
/// `share` resolves once the user completes or dismisses the surface;
/// dismissal is not an error.
#[async_trait]
pub trait SharePlatform: Send + Sync {
    /// Human-readable platform name
    fn name(&self) -> &str;

    /// Whether sharing can be attempted at all
    async fn is_available(&self) -> bool;

    async fn share(&self, payload: &SharePayload, options: &ShareOptions) -> Result<()>;
}

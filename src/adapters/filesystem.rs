//! `FileSystem` backed by `tokio::fs`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;

use super::FileSystem;

/// Local disk with a private writable directory for share copies
pub struct LocalFileSystem {
    private_dir: PathBuf,
}

impl LocalFileSystem {
    pub fn new(private_dir: impl Into<PathBuf>) -> Self {
        Self {
            private_dir: private_dir.into(),
        }
    }
}

async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn size(&self, path: &Path) -> Result<u64> {
        let metadata = fs::metadata(path)
            .await
            .with_context(|| format!("Failed to stat {}", path.display()))?;
        Ok(metadata.len())
    }

    async fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        ensure_parent(to).await?;
        fs::copy(from, to)
            .await
            .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))
    }

    async fn write(&self, path: &Path, contents: &str) -> Result<()> {
        ensure_parent(path).await?;
        fs::write(path, contents)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    async fn read(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        fs::remove_file(path)
            .await
            .with_context(|| format!("Failed to delete {}", path.display()))
    }

    fn private_dir(&self) -> &Path {
        &self.private_dir
    }
}

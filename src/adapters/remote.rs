//! Bundled payloads served over HTTP.
//!
//! Used when the application ships a catalog entry without its audio file
//! and a remote base URL is configured.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::{BundledResource, LocalAsset};

/// A payload downloaded from a URL into the cache directory
pub struct RemoteResource {
    url: String,
    cache_dir: PathBuf,
    file_name: String,
    client: reqwest::Client,
}

impl RemoteResource {
    pub fn new(
        url: impl Into<String>,
        cache_dir: impl Into<PathBuf>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            cache_dir: cache_dir.into(),
            file_name: file_name.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl BundledResource for RemoteResource {
    fn describe(&self) -> String {
        format!("remote {}", self.url)
    }

    async fn download(&self) -> Result<LocalAsset> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Failed to request {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Download of {} failed with HTTP {}", self.url, status);
        }

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read body of {}", self.url))?;

        if bytes.is_empty() {
            anyhow::bail!("Download of {} returned an empty body", self.url);
        }

        fs::create_dir_all(&self.cache_dir).await.with_context(|| {
            format!("Failed to create cache directory: {}", self.cache_dir.display())
        })?;

        let destination = self.cache_dir.join(&self.file_name);
        fs::write(&destination, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", destination.display()))?;

        debug!(url = %self.url, size = bytes.len(), "Downloaded remote asset");
        Ok(LocalAsset::new(destination, Some(bytes.len() as u64)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_resource_describe() {
        let resource = RemoteResource::new("https://cdn.example.com/a.mp3", "/tmp/cache", "a.mp3");
        assert_eq!(resource.url(), "https://cdn.example.com/a.mp3");
        assert_eq!(resource.describe(), "remote https://cdn.example.com/a.mp3");
    }

    #[tokio::test]
    async fn test_unreachable_host_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        // Port 9 on loopback (discard) is not expected to serve HTTP
        let resource = RemoteResource::new("http://127.0.0.1:9/a.mp3", temp.path(), "a.mp3");
        assert!(resource.download().await.is_err());
        assert!(!temp.path().join("a.mp3").exists());
    }
}

//! Share strategies and the fallback chain that runs them.
//!
//! Each reference kind maps to an ordered list of strategies:
//!
//! | Reference   | Strategies                         |
//! |-------------|------------------------------------|
//! | Bundled     | `AssetDirect`, then `AssetCopy`    |
//! | Remote URL  | `RemoteUrl`, then `TextFallback`   |
//! | Local file  | `LocalFile`                        |
//!
//! The chain stops at the first success. When every strategy fails, the
//! outcome carries the method and error of the last one attempted.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::adapters::{FileSystem, SharePayload, ShareOptions, SharePlatform};
use crate::domain::{RefKind, ResourceHandle, ShareMethod, ShareOutcome, ShareRequest};

use super::debug_log::DebugLog;
use super::error::ShareError;
use super::resolver::AssetResolver;

/// Collaborators available to a strategy
pub struct ShareContext<'a> {
    pub resolver: &'a AssetResolver,
    pub fs: &'a dyn FileSystem,
    pub platform: &'a dyn SharePlatform,
    pub log: &'a DebugLog,
}

/// One way of delivering a share
#[async_trait]
pub trait ShareStrategy: Send + Sync {
    /// Name used in log lines
    fn name(&self) -> &'static str;

    /// Method reported in the outcome
    fn method(&self) -> ShareMethod;

    async fn attempt(
        &self,
        ctx: &ShareContext<'_>,
        request: &ShareRequest,
    ) -> Result<ShareOutcome, ShareError>;
}

/// Share the resolved bundled file in place
pub struct AssetDirect {
    pub handle: ResourceHandle,
}

#[async_trait]
impl ShareStrategy for AssetDirect {
    fn name(&self) -> &'static str {
        "direct asset share"
    }

    fn method(&self) -> ShareMethod {
        ShareMethod::AssetDirect
    }

    async fn attempt(
        &self,
        ctx: &ShareContext<'_>,
        request: &ShareRequest,
    ) -> Result<ShareOutcome, ShareError> {
        let asset = ctx.resolver.resolve_handle(self.handle).await?;
        let path = loaded_path(&asset.shareable_path, self.handle)?;
        ctx.log.log(format!("Shareable path: {}", path.display()));

        let mime_type = request.mime_type_for(&path.to_string_lossy());
        let options = ShareOptions::new(mime_type, &request.title);
        ctx.platform
            .share(&SharePayload::File(path), &options)
            .await
            .map_err(ShareError::invocation)?;

        Ok(ShareOutcome::success(self.method()).with_size(asset.size_bytes))
    }
}

/// Copy the resolved bundled file into the private directory, then share the copy
pub struct AssetCopy {
    pub handle: ResourceHandle,
}

#[async_trait]
impl ShareStrategy for AssetCopy {
    fn name(&self) -> &'static str {
        "copy-then-share"
    }

    fn method(&self) -> ShareMethod {
        ShareMethod::AssetCopy
    }

    async fn attempt(
        &self,
        ctx: &ShareContext<'_>,
        request: &ShareRequest,
    ) -> Result<ShareOutcome, ShareError> {
        let asset = ctx.resolver.resolve_handle(self.handle).await?;
        let source = loaded_path(&asset.shareable_path, self.handle)?;

        let destination = ctx.fs.private_dir().join(share_file_name(&request.title, &source));

        if destination == source {
            ctx.log.log(format!("Asset already in place: {}", destination.display()));
        } else {
            ctx.log.log(format!("Copying asset to: {}", destination.display()));
            ctx.fs.copy(&source, &destination).await.map_err(|e| {
                ShareError::ResolutionFailed(format!("Failed to copy asset: {:#}", e))
            })?;
        }

        let size = match verify_copy(ctx.fs, &destination).await {
            Ok(size) => size,
            Err(e) => {
                // The cached payload may be the file that failed verification
                ctx.resolver.invalidate_handle(self.handle).await;
                return Err(e);
            }
        };
        debug!(destination = %destination.display(), size, "Copied asset verified");

        let mime_type = request.mime_type_for(&source.to_string_lossy());
        let options = ShareOptions::new(mime_type, &request.title);
        ctx.platform
            .share(&SharePayload::File(destination.clone()), &options)
            .await
            .map_err(ShareError::invocation)?;

        Ok(ShareOutcome::success(self.method())
            .with_destination(destination)
            .with_size(Some(size)))
    }
}

/// Hand a remote URL straight to the share surface
pub struct RemoteUrl {
    pub url: String,
}

#[async_trait]
impl ShareStrategy for RemoteUrl {
    fn name(&self) -> &'static str {
        "remote URL share"
    }

    fn method(&self) -> ShareMethod {
        ShareMethod::RemoteUrl
    }

    async fn attempt(
        &self,
        ctx: &ShareContext<'_>,
        request: &ShareRequest,
    ) -> Result<ShareOutcome, ShareError> {
        let mime_type = request.mime_type_for(&self.url);
        ctx.log.log(format!("Sharing remote URL {} as {}", self.url, mime_type));

        let options = ShareOptions::new(mime_type, &request.title);
        ctx.platform
            .share(&SharePayload::Url(self.url.clone()), &options)
            .await
            .map_err(ShareError::invocation)?;

        Ok(ShareOutcome::success(self.method()))
    }
}

/// Share a descriptive message with the link instead of the audio itself
pub struct TextFallback {
    pub url: String,
}

#[async_trait]
impl ShareStrategy for TextFallback {
    fn name(&self) -> &'static str {
        "text share"
    }

    fn method(&self) -> ShareMethod {
        ShareMethod::RemoteUrl
    }

    async fn attempt(
        &self,
        ctx: &ShareContext<'_>,
        request: &ShareRequest,
    ) -> Result<ShareOutcome, ShareError> {
        let text = request.share_text(&self.url);
        let options = ShareOptions::new("text/plain", &request.title);

        ctx.platform
            .share(&SharePayload::Text(text), &options)
            .await
            .map_err(ShareError::invocation)?;

        Ok(ShareOutcome::success(self.method()))
    }
}

/// Share an existing file on disk
pub struct LocalFile {
    pub path: PathBuf,
}

#[async_trait]
impl ShareStrategy for LocalFile {
    fn name(&self) -> &'static str {
        "local file share"
    }

    fn method(&self) -> ShareMethod {
        ShareMethod::LocalFile
    }

    async fn attempt(
        &self,
        ctx: &ShareContext<'_>,
        request: &ShareRequest,
    ) -> Result<ShareOutcome, ShareError> {
        if !ctx.fs.exists(&self.path).await {
            return Err(ShareError::FileNotFound(self.path.clone()));
        }

        let size = ctx.fs.size(&self.path).await.ok();
        let options = ShareOptions::new(
            request.mime_type_for(&self.path.to_string_lossy()),
            &request.title,
        );

        ctx.platform
            .share(&SharePayload::File(self.path.clone()), &options)
            .await
            .map_err(ShareError::invocation)?;

        Ok(ShareOutcome::success(self.method()).with_size(size))
    }
}

/// Ordered strategies, run until one succeeds
pub struct StrategyChain {
    strategies: Vec<Box<dyn ShareStrategy>>,
}

impl StrategyChain {
    pub fn new(strategies: Vec<Box<dyn ShareStrategy>>) -> Self {
        Self { strategies }
    }

    /// Standard chain for a classified reference
    pub fn for_kind(kind: RefKind) -> Self {
        let strategies: Vec<Box<dyn ShareStrategy>> = match kind {
            RefKind::Bundled(handle) => vec![
                Box::new(AssetDirect { handle }),
                Box::new(AssetCopy { handle }),
            ],
            RefKind::RemoteUrl(url) => vec![
                Box::new(RemoteUrl { url: url.clone() }),
                Box::new(TextFallback { url }),
            ],
            RefKind::LocalFile(path) => vec![Box::new(LocalFile { path })],
            RefKind::Unsupported => Vec::new(),
        };
        Self::new(strategies)
    }

    /// Methods in the order they will be attempted
    pub fn methods(&self) -> Vec<ShareMethod> {
        self.strategies.iter().map(|s| s.method()).collect()
    }

    pub async fn run(&self, ctx: &ShareContext<'_>, request: &ShareRequest) -> ShareOutcome {
        let mut last_failure: Option<(ShareMethod, ShareError)> = None;

        for (index, strategy) in self.strategies.iter().enumerate() {
            ctx.log.log(format!("Attempting {}", strategy.name()));

            match strategy.attempt(ctx, request).await {
                Ok(outcome) => return outcome,
                Err(e) => {
                    warn!(strategy = strategy.name(), error = %e, "Share strategy failed");
                    ctx.log.log(format!("{} failed: {}", strategy.name(), e));
                    if index + 1 < self.strategies.len() {
                        ctx.log.log("Falling back to next strategy");
                    }
                    last_failure = Some((strategy.method(), e));
                }
            }
        }

        match last_failure {
            Some((method, error)) => ShareOutcome::failure(method, error.to_string()),
            None => ShareOutcome::failure(
                ShareMethod::Unsupported,
                ShareError::Unsupported("no strategy applies".to_string()).to_string(),
            ),
        }
    }
}

/// A share copy must exist and be non-empty
async fn verify_copy(fs: &dyn FileSystem, destination: &Path) -> Result<u64, ShareError> {
    if !fs.exists(destination).await {
        return Err(ShareError::CopyVerificationFailed(format!(
            "{} is missing after copy",
            destination.display()
        )));
    }

    let size = fs
        .size(destination)
        .await
        .map_err(|e| ShareError::CopyVerificationFailed(format!("{:#}", e)))?;
    if size == 0 {
        return Err(ShareError::CopyVerificationFailed(format!(
            "{} is empty",
            destination.display()
        )));
    }

    Ok(size)
}

fn loaded_path(path: &Option<PathBuf>, handle: ResourceHandle) -> Result<PathBuf, ShareError> {
    path.clone().ok_or_else(|| {
        ShareError::ResolutionFailed(format!("no shareable path for bundled resource {}", handle))
    })
}

/// File name for a share copy: the title with every non-alphanumeric
/// character replaced by `_`, keeping the source extension
pub fn share_file_name(title: &str, source: &Path) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let stem = if stem.is_empty() { "shared_audio".to_string() } else { stem };

    let extension = source
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .unwrap_or("mp3");

    format!("{}.{}", stem, extension)
}

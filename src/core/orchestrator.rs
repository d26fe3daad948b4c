//! Share orchestrator.
//!
//! Checks that sharing is possible, classifies the reference, runs the
//! matching strategy chain and records the outcome in the debug log.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};

use crate::adapters::{FileSystem, SharePlatform};
use crate::domain::{RefKind, ShareMethod, ShareOutcome, ShareRequest};

use super::debug_log::DebugLog;
use super::error::ShareError;
use super::resolver::AssetResolver;
use super::strategy::{ShareContext, StrategyChain};

/// Delivers audio references to the platform share surface
pub struct ShareOrchestrator {
    resolver: Arc<AssetResolver>,
    fs: Arc<dyn FileSystem>,
    platform: Arc<dyn SharePlatform>,
    log: Arc<DebugLog>,
}

impl ShareOrchestrator {
    pub fn new(
        resolver: Arc<AssetResolver>,
        fs: Arc<dyn FileSystem>,
        platform: Arc<dyn SharePlatform>,
        log: Arc<DebugLog>,
    ) -> Self {
        Self {
            resolver,
            fs,
            platform,
            log,
        }
    }

    pub fn resolver(&self) -> &Arc<AssetResolver> {
        &self.resolver
    }

    pub fn debug_log(&self) -> &Arc<DebugLog> {
        &self.log
    }

    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    pub fn platform(&self) -> &Arc<dyn SharePlatform> {
        &self.platform
    }

    /// Share a request, returning how it went
    ///
    /// Never returns an error: failures are described by the outcome.
    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn share(&self, request: &ShareRequest) -> ShareOutcome {
        let started = Instant::now();
        self.log.log(format!("Starting share for: {}", request.title));
        self.log.log(format!("Source: {}", request.source));
        self.log.log(format!("Platform: {}", self.platform.name()));

        let outcome = self.run(request).await;

        self.log.log(outcome.summary());
        self.log.log(format!(
            "Share process completed in {}ms",
            started.elapsed().as_millis()
        ));

        if outcome.success {
            info!(method = %outcome.method, "Share completed");
        } else {
            warn!(
                method = %outcome.method,
                error = outcome.error.as_deref().unwrap_or_default(),
                "Share failed"
            );
        }

        outcome
    }

    /// Share a catalog entry by id
    pub async fn share_entry(&self, id: &str) -> ShareOutcome {
        let request = self
            .resolver
            .entry(id)
            .zip(self.resolver.handle_for(id))
            .map(|(entry, handle)| ShareRequest::for_entry(entry, handle));

        match request {
            Some(request) => self.share(&request).await,
            None => {
                let outcome = ShareOutcome::failure(
                    ShareMethod::Unsupported,
                    ShareError::AssetNotFound(id.to_string()).to_string(),
                );
                self.log.log(outcome.summary());
                outcome
            }
        }
    }

    async fn run(&self, request: &ShareRequest) -> ShareOutcome {
        if !self.platform.is_available().await {
            return ShareOutcome::failure(
                ShareMethod::Unsupported,
                ShareError::CapabilityUnavailable.to_string(),
            );
        }

        let kind = request.source.classify();
        if kind == RefKind::Unsupported {
            return ShareOutcome::failure(
                ShareMethod::Unsupported,
                ShareError::Unsupported(request.source.to_string()).to_string(),
            );
        }

        let ctx = ShareContext {
            resolver: &self.resolver,
            fs: self.fs.as_ref(),
            platform: self.platform.as_ref(),
            log: &self.log,
        };

        StrategyChain::for_kind(kind).run(&ctx, request).await
    }
}

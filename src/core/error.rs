//! Errors raised while sharing.

use std::path::PathBuf;

use thiserror::Error;

use super::resolver::ResolveError;

/// Share failures, classified by where they happened
#[derive(Debug, Clone, Error)]
pub enum ShareError {
    #[error("Sharing is not available on this device")]
    CapabilityUnavailable,

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Resolution failed: {0}")]
    ResolutionFailed(String),

    #[error("Copied file verification failed: {0}")]
    CopyVerificationFailed(String),

    #[error("Share invocation failed: {0}")]
    ShareInvocationFailed(String),

    #[error("Local file does not exist: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Unsupported audio reference: {0}")]
    Unsupported(String),
}

impl From<ResolveError> for ShareError {
    fn from(error: ResolveError) -> Self {
        match error {
            ResolveError::AssetNotFound(id) => ShareError::AssetNotFound(id),
            ResolveError::NotInitialized => ShareError::ResolutionFailed(error.to_string()),
            ResolveError::ResolutionFailed { .. } => {
                ShareError::ResolutionFailed(error.to_string())
            }
        }
    }
}

impl ShareError {
    /// Wrap a failed platform share call
    pub fn invocation(error: anyhow::Error) -> Self {
        ShareError::ShareInvocationFailed(format!("{:#}", error))
    }
}

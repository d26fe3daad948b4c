//! Domain types for clipshare.
//!
//! - Asset: bundled handles and resolved-asset cache records
//! - Share: share requests, reference classification and outcomes

pub mod asset;
pub mod share;

// Re-export commonly used types
pub use asset::{CacheStats, ResolvedAsset, ResourceHandle};
pub use share::{
    infer_mime_type, AudioRef, RefKind, ShareMethod, ShareOutcome, ShareRequest,
    DEFAULT_AUDIO_MIME,
};

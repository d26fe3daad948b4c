//! clipshare - Bundled audio clip catalog with native sharing
//!
//! Resolves audio clips shipped with the application to shareable local
//! files and hands them, or remote URLs and local files, to the platform
//! share surface, falling back through progressively simpler methods.
//!
//! # Architecture
//!
//! - The asset resolver fetches each bundled payload at most once and caches
//!   its shareable path until the cache is cleared
//! - The share orchestrator checks capability, classifies the reference and
//!   runs a chain of strategies until one succeeds
//! - Every step is narrated into a bounded debug log that can be exported
//!
//! # Modules
//!
//! - `adapters`: Host capabilities (bundled resources, file system, share surface)
//! - `core`: Resolver, strategies, orchestrator, debug log, diagnostics
//! - `domain`: Data structures (ResourceHandle, ShareRequest, ShareOutcome)
//! - `library`: Clip catalog and favorites
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # List bundled clips
//! clipshare list
//!
//! # Share a clip by id
//! clipshare share doorbell
//!
//! # Share a URL, exporting the debug log afterwards
//! clipshare share https://example.com/song.wav --title "Song" --export-log
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod library;

// Re-export main types at crate root for convenience
pub use core::{AssetResolver, DebugLog, ShareError, ShareOrchestrator};
pub use domain::{AudioRef, ResourceHandle, ShareMethod, ShareOutcome, ShareRequest};
pub use library::{Catalog, CatalogEntry, Favorites};

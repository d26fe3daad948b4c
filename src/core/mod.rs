//! Core sharing logic.
//!
//! This module contains:
//! - DebugLog: Bounded narration buffer
//! - AssetResolver: Bundled payload -> shareable path, cached per entry
//! - Strategies: Individual share methods and the fallback chain
//! - ShareOrchestrator: Capability check, classification, chain execution
//! - Diagnostics: Sharing self-test

pub mod debug_log;
pub mod diagnostics;
pub mod error;
pub mod orchestrator;
pub mod resolver;
pub mod strategy;

// Re-export commonly used types
pub use debug_log::{DebugLog, DebugLogEntry, DEFAULT_CAPACITY};
pub use diagnostics::{run_diagnostics, run_diagnostics_with_share, Diagnostics};
pub use error::ShareError;
pub use orchestrator::ShareOrchestrator;
pub use resolver::{AssetResolver, CatalogSource, ResolveError};
pub use strategy::{share_file_name, ShareContext, ShareStrategy, StrategyChain};

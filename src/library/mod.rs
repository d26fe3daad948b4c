//! Clip library: the static catalog and the user's favorites.
//!
//! # Storage Layout
//!
//! ```text
//! ~/.clipshare/
//! ├── clips.yaml                # Catalog manifest
//! ├── favorites.json            # Favorites and share counts
//! ├── assets/                   # Bundled audio payloads, keyed by filename
//! ├── cache/                    # Resolved (downloaded/copied) assets
//! └── shared/                   # Private writable directory for share copies
//! ```

pub mod catalog;
pub mod favorites;

pub use catalog::{entry_id_for, Catalog, CatalogEntry};
pub use favorites::{ClipActivity, Favorites};

//! Favorites and per-clip share counters.
//!
//! Persisted as a small JSON document next to the engine state
//! (`$CLIPSHARE_HOME/favorites.json`).

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Favorites store keyed by catalog entry id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorites {
    /// Store format version
    pub version: u32,

    /// Activity per clip id
    #[serde(default)]
    pub clips: BTreeMap<String, ClipActivity>,
}

/// What the user has done with a single clip
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipActivity {
    #[serde(default)]
    pub favorite: bool,

    #[serde(default)]
    pub share_count: u32,

    /// Last time any field changed
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Favorites {
    fn default() -> Self {
        Self::new()
    }
}

impl Favorites {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            version: 1,
            clips: BTreeMap::new(),
        }
    }

    /// Load the store from disk; a missing file is an empty store
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read favorites: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse favorites JSON")
    }

    /// Save the store to disk
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write favorites: {}", path.display()))?;

        Ok(())
    }

    fn touch(&mut self, id: &str) -> &mut ClipActivity {
        let activity = self.clips.entry(id.to_string()).or_default();
        activity.updated_at = Some(Utc::now());
        activity
    }

    /// Flip the favorite flag, returning the new value
    pub fn toggle(&mut self, id: &str) -> bool {
        let activity = self.touch(id);
        activity.favorite = !activity.favorite;
        activity.favorite
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.clips.get(id).map(|a| a.favorite).unwrap_or(false)
    }

    /// Record a completed share
    pub fn record_share(&mut self, id: &str) -> u32 {
        let activity = self.touch(id);
        activity.share_count += 1;
        activity.share_count
    }

    /// Favorite clip ids in id order
    pub fn favorite_ids(&self) -> Vec<&str> {
        self.clips
            .iter()
            .filter(|(_, a)| a.favorite)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn activity(&self, id: &str) -> Option<&ClipActivity> {
        self.clips.get(id)
    }
}

//! Configuration for clipshare.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (CLIPSHARE_HOME, CLIPSHARE_ASSETS)
//! 2. Config file (.clipshare/config.yaml)
//! 3. Defaults (~/.clipshare)
//!
//! Config file discovery:
//! - Searches current directory and parents for .clipshare/config.yaml
//! - Paths in config file are relative to the .clipshare/ directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::share::default_opener;
use crate::core::DEFAULT_CAPACITY;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub share: Option<ShareConfig>,
    #[serde(default)]
    pub debug_log: Option<DebugLogConfig>,
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Engine state directory
    pub home: Option<String>,
    /// Bundled audio directory
    pub assets: Option<String>,
    /// Catalog manifest
    pub catalog: Option<String>,
    /// Resolved-asset cache directory
    pub cache: Option<String>,
    /// Private writable directory for share copies
    pub shared: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShareConfig {
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    pub text_command: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DebugLogConfig {
    pub capacity: Option<usize>,
    pub export_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    pub base_url: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Engine state directory
    pub home: PathBuf,
    /// Bundled audio directory
    pub assets: PathBuf,
    /// Catalog manifest path
    pub catalog: PathBuf,
    /// Resolved-asset cache directory
    pub cache: PathBuf,
    /// Private writable directory for share copies
    pub shared: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub share: ShareSettings,
    pub debug_log: DebugLogSettings,
    /// Base URL for clips missing from the assets directory
    pub remote_base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareSettings {
    pub command: String,
    pub args: Vec<String>,
    pub text_command: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for ShareSettings {
    fn default() -> Self {
        Self {
            command: default_opener().to_string(),
            args: Vec::new(),
            text_command: None,
            timeout_seconds: 60,
        }
    }
}

impl ShareSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugLogSettings {
    pub capacity: usize,
    pub export_file: String,
}

impl Default for DebugLogSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            export_file: "sharing_service_debug.log".to_string(),
        }
    }
}

impl ResolvedConfig {
    /// Defaults rooted at `home`
    pub fn with_home(home: PathBuf) -> Self {
        Self {
            assets: home.join("assets"),
            catalog: home.join("clips.yaml"),
            cache: home.join("cache"),
            shared: home.join("shared"),
            home,
            config_file: None,
            share: ShareSettings::default(),
            debug_log: DebugLogSettings::default(),
            remote_base_url: None,
        }
    }

    /// Where the debug log is exported
    pub fn debug_log_export_path(&self) -> PathBuf {
        self.shared.join(&self.debug_log.export_file)
    }

    /// Favorites store location
    pub fn favorites_path(&self) -> PathBuf {
        self.home.join("favorites.json")
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".clipshare").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's directory
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Apply a parsed config file on top of defaults
///
/// `home_override` (from the environment) wins over the file's `home`.
fn apply_config_file(
    config: ConfigFile,
    config_path: &Path,
    home_override: Option<PathBuf>,
    default_home: PathBuf,
) -> ResolvedConfig {
    let base_dir = config_path.parent().unwrap_or(Path::new("."));
    let resolve = |value: &Option<String>| value.as_deref().map(|p| resolve_path(base_dir, p));

    let home = home_override
        .or_else(|| resolve(&config.paths.home))
        .unwrap_or(default_home);
    let mut resolved = ResolvedConfig::with_home(home);

    if let Some(assets) = resolve(&config.paths.assets) {
        resolved.assets = assets;
    }
    if let Some(catalog) = resolve(&config.paths.catalog) {
        resolved.catalog = catalog;
    }
    if let Some(cache) = resolve(&config.paths.cache) {
        resolved.cache = cache;
    }
    if let Some(shared) = resolve(&config.paths.shared) {
        resolved.shared = shared;
    }

    if let Some(share) = config.share {
        let defaults = ShareSettings::default();
        resolved.share = ShareSettings {
            command: share.command.unwrap_or(defaults.command),
            args: share.args,
            text_command: share.text_command,
            timeout_seconds: share.timeout_seconds.unwrap_or(defaults.timeout_seconds),
        };
    }

    if let Some(debug_log) = config.debug_log {
        let defaults = DebugLogSettings::default();
        resolved.debug_log = DebugLogSettings {
            capacity: debug_log.capacity.unwrap_or(defaults.capacity),
            export_file: debug_log.export_file.unwrap_or(defaults.export_file),
        };
    }

    resolved.remote_base_url = config.remote.and_then(|r| r.base_url);
    resolved.config_file = Some(config_path.to_path_buf());
    resolved
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".clipshare");

    let env_home = std::env::var("CLIPSHARE_HOME").ok().map(PathBuf::from);

    let mut resolved = match find_config_file() {
        Some(config_path) => {
            let config = load_config_file(&config_path)?;
            apply_config_file(config, &config_path, env_home, default_home)
        }
        None => ResolvedConfig::with_home(env_home.unwrap_or(default_home)),
    };

    if let Ok(env_assets) = std::env::var("CLIPSHARE_ASSETS") {
        resolved.assets = PathBuf::from(env_assets);
    }

    Ok(resolved)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_rooted_at_home() {
        let config = ResolvedConfig::with_home(PathBuf::from("/test/.clipshare"));

        assert_eq!(config.assets, PathBuf::from("/test/.clipshare/assets"));
        assert_eq!(config.catalog, PathBuf::from("/test/.clipshare/clips.yaml"));
        assert_eq!(config.cache, PathBuf::from("/test/.clipshare/cache"));
        assert_eq!(
            config.debug_log_export_path(),
            PathBuf::from("/test/.clipshare/shared/sharing_service_debug.log")
        );
        assert_eq!(config.debug_log.capacity, 100);
        assert_eq!(config.share.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".clipshare");
        std::fs::create_dir_all(&dir).unwrap();

        let config_path = dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
paths:
  assets: /srv/clips
  catalog: clips.yaml
share:
  command: open
  args: ["-a", "AirDrop"]
  timeout_seconds: 30
debug_log:
  capacity: 50
remote:
  base_url: https://cdn.example.com/clips
"#
        )
        .unwrap();

        let parsed = load_config_file(&config_path).unwrap();
        assert_eq!(parsed.version, "1.0");
        assert_eq!(parsed.paths.assets.as_deref(), Some("/srv/clips"));

        let resolved = apply_config_file(parsed, &config_path, None, temp.path().join("home"));
        assert_eq!(resolved.home, temp.path().join("home"));
        assert_eq!(resolved.assets, PathBuf::from("/srv/clips"));
        assert_eq!(resolved.catalog, dir.join("clips.yaml"));
        assert_eq!(resolved.share.command, "open");
        assert_eq!(resolved.share.args, vec!["-a", "AirDrop"]);
        assert_eq!(resolved.share.timeout_seconds, 30);
        assert_eq!(resolved.debug_log.capacity, 50);
        assert_eq!(resolved.debug_log.export_file, "sharing_service_debug.log");
        assert_eq!(
            resolved.remote_base_url.as_deref(),
            Some("https://cdn.example.com/clips")
        );
        assert_eq!(resolved.config_file, Some(config_path.clone()));

        // Environment home re-roots everything the file leaves unset
        let parsed = load_config_file(&config_path).unwrap();
        let resolved = apply_config_file(
            parsed,
            &config_path,
            Some(PathBuf::from("/env/home")),
            temp.path().join("home"),
        );
        assert_eq!(resolved.home, PathBuf::from("/env/home"));
        assert_eq!(resolved.cache, PathBuf::from("/env/home/cache"));
        assert_eq!(resolved.assets, PathBuf::from("/srv/clips"));
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project/.clipshare");

        assert_eq!(
            resolve_path(&base, "./assets"),
            PathBuf::from("/home/user/project/.clipshare/assets")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }
}

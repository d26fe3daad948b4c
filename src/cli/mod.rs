//! Command-line interface for clipshare.
//!
//! Provides commands for browsing the clip catalog, resolving and preloading
//! bundled assets, sharing clips, managing favorites and running sharing
//! diagnostics.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::{
    AssetBundle, AssetStatus, CommandShare, FileSystem, LocalFileSystem, SharePlatform,
};
use crate::config::{self, ResolvedConfig};
use crate::core::{
    run_diagnostics, run_diagnostics_with_share, AssetResolver, CatalogSource, DebugLog,
    ShareOrchestrator,
};
use crate::domain::ShareRequest;
use crate::library::{Catalog, CatalogEntry, Favorites};

/// clipshare - Bundled audio clip catalog with native sharing
#[derive(Parser, Debug)]
#[command(name = "clipshare")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List clips in the catalog
    List {
        /// Only show clips in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Maximum number of clips to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Search clips by title, author or tag
    Search {
        /// Search query
        query: String,
    },

    /// Show details of a clip
    Show {
        /// Clip ID
        id: String,
    },

    /// Check every catalog entry for a bundled payload
    Validate,

    /// Resolve a clip to its shareable local path
    Resolve {
        /// Clip ID
        id: String,
    },

    /// Resolve every clip up front
    Preload,

    /// Show resolver cache statistics
    Stats {
        /// Preload every clip first
        #[arg(long)]
        preload: bool,
    },

    /// Share a clip, URL or local file
    Share {
        /// Clip ID, URL or file path
        target: String,

        /// Title for URLs and files (defaults to the target)
        #[arg(long)]
        title: Option<String>,

        /// Explicit MIME type (inferred from the extension otherwise)
        #[arg(long)]
        mime_type: Option<String>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,

        /// Print the debug log after sharing
        #[arg(long)]
        show_log: bool,

        /// Export the debug log after sharing
        #[arg(long)]
        export_log: bool,
    },

    /// Toggle a clip as favorite
    Favorite {
        /// Clip ID
        id: String,
    },

    /// List favorite clips
    Favorites,

    /// Check sharing availability and private directory access
    Diagnose {
        /// Also share a throwaway audio file end to end
        #[arg(long)]
        share_test: bool,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Services wired from the resolved configuration
struct App {
    config: &'static ResolvedConfig,
    catalog: Catalog,
    bundle: Arc<AssetBundle>,
    log: Arc<DebugLog>,
    fs: Arc<dyn FileSystem>,
    platform: Arc<dyn SharePlatform>,
    resolver: Arc<AssetResolver>,
}

impl App {
    async fn build() -> Result<Self> {
        let config = config::config()?;

        let catalog = Catalog::load(&config.catalog).await.with_context(|| {
            format!(
                "No usable catalog at {} (set paths.catalog in .clipshare/config.yaml)",
                config.catalog.display()
            )
        })?;

        let bundle = Arc::new(AssetBundle::from_directory(
            &catalog,
            &config.assets,
            &config.cache,
            config.remote_base_url.as_deref(),
        ));

        let log = Arc::new(DebugLog::with_capacity(
            config.debug_log.capacity,
            config.debug_log_export_path(),
        ));

        let fs: Arc<dyn FileSystem> = Arc::new(LocalFileSystem::new(&config.shared));

        let mut share = CommandShare::new(&config.share.command)
            .with_args(config.share.args.iter().cloned())
            .with_timeout(config.share.timeout());
        if let Some(text_command) = &config.share.text_command {
            share = share.with_text_program(text_command);
        }
        let platform: Arc<dyn SharePlatform> = Arc::new(share);

        let resolver = Arc::new(AssetResolver::new(
            CatalogSource::Inline(catalog.clone()),
            Arc::clone(&bundle),
            Arc::clone(&log),
        ));
        resolver.initialize().await?;

        Ok(Self {
            config,
            catalog,
            bundle,
            log,
            fs,
            platform,
            resolver,
        })
    }

    fn orchestrator(&self) -> ShareOrchestrator {
        ShareOrchestrator::new(
            Arc::clone(&self.resolver),
            Arc::clone(&self.fs),
            Arc::clone(&self.platform),
            Arc::clone(&self.log),
        )
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Config => show_config(),
            Commands::List { category, limit } => list_clips(category, limit).await,
            Commands::Search { query } => search_clips(&query).await,
            Commands::Show { id } => show_clip(&id).await,
            Commands::Validate => validate_bundle().await,
            Commands::Resolve { id } => resolve_clip(&id).await,
            Commands::Preload => preload().await,
            Commands::Stats { preload } => show_stats(preload).await,
            Commands::Share {
                target,
                title,
                mime_type,
                json,
                show_log,
                export_log,
            } => share(&target, title, mime_type, json, show_log, export_log).await,
            Commands::Favorite { id } => toggle_favorite(&id).await,
            Commands::Favorites => list_favorites().await,
            Commands::Diagnose { share_test } => diagnose(share_test).await,
        }
    }
}

fn print_entry_row(entry: &CatalogEntry, favorite: bool) {
    let marker = if favorite { "*" } else { " " };
    println!(
        "{} {:<24} {:<32} {:<16} {}",
        marker,
        entry.id,
        entry.title,
        entry.category,
        entry.author
    );
}

fn print_entry_header() {
    println!(
        "  {:<24} {:<32} {:<16} {}",
        "ID", "TITLE", "CATEGORY", "AUTHOR"
    );
    println!("{}", "-".repeat(90));
}

/// List clips, optionally filtered by category
async fn list_clips(category: Option<String>, limit: usize) -> Result<()> {
    let app = App::build().await?;
    let favorites = Favorites::load(&app.config.favorites_path()).await?;

    let entries: Vec<&CatalogEntry> = match &category {
        Some(category) => app.catalog.filter_by_category(category),
        None => app.catalog.iter().collect(),
    };

    if entries.is_empty() {
        println!("No clips found");
        return Ok(());
    }

    print_entry_header();
    for entry in entries.into_iter().take(limit) {
        print_entry_row(entry, favorites.is_favorite(&entry.id));
    }

    Ok(())
}

/// Search the catalog
async fn search_clips(query: &str) -> Result<()> {
    let app = App::build().await?;
    let favorites = Favorites::load(&app.config.favorites_path()).await?;
    let results = app.catalog.search(query);

    if results.is_empty() {
        println!("No clips matching '{}'", query);
        return Ok(());
    }

    println!("Found {} clip(s):\n", results.len());
    print_entry_header();
    for entry in results {
        print_entry_row(entry, favorites.is_favorite(&entry.id));
    }

    Ok(())
}

/// Show details of a single clip
async fn show_clip(id: &str) -> Result<()> {
    let app = App::build().await?;
    let entry = app
        .catalog
        .get(id)
        .with_context(|| format!("Clip not found: {}", id))?;
    let favorites = Favorites::load(&app.config.favorites_path()).await?;

    println!("ID: {}", entry.id);
    println!("Title: {}", entry.title);
    println!("File: {}", entry.filename);
    println!("Author: {}", entry.author);
    println!("Category: {}", entry.category);
    if !entry.description.is_empty() {
        println!("Description: {}", entry.description);
    }
    if !entry.tags.is_empty() {
        let tags: Vec<&str> = entry.tags.iter().map(String::as_str).collect();
        println!("Tags: {}", tags.join(", "));
    }
    if let Some(seconds) = entry.estimated_duration_seconds {
        println!("Duration: ~{}s", seconds);
    }
    match app.resolver.handle_for(id) {
        Some(handle) => println!("Bundled: yes ({})", handle),
        None => println!("Bundled: no"),
    }
    if let Some(activity) = favorites.activity(id) {
        println!("Favorite: {}", activity.favorite);
        println!("Shared: {} time(s)", activity.share_count);
    }

    Ok(())
}

/// Report which catalog entries have a bundled payload
async fn validate_bundle() -> Result<()> {
    let app = App::build().await?;
    let checks = app.bundle.validate(&app.catalog);
    let available = checks.iter().filter(|c| c.is_available()).count();

    for check in &checks {
        match &check.status {
            AssetStatus::Available { handle, source } => {
                println!("[ok]      {} ({}) {}", check.filename, handle, source);
            }
            AssetStatus::Missing => {
                println!("[missing] {} - no bundled payload", check.filename);
            }
        }
    }
    println!("\n{} of {} clips available", available, checks.len());

    if available == 0 && !checks.is_empty() {
        anyhow::bail!("No bundled clips are available");
    }

    Ok(())
}

/// Resolve one clip and print its path
async fn resolve_clip(id: &str) -> Result<()> {
    let app = App::build().await?;
    let path = app.resolver.resolve(id).await?;
    println!("{}", path.display());
    Ok(())
}

/// Resolve every clip
async fn preload() -> Result<()> {
    let app = App::build().await?;
    app.resolver.preload_all().await?;

    let stats = app.resolver.stats().await;
    println!("Preloaded {} of {} clips", stats.loaded, stats.total);
    Ok(())
}

/// Print resolver statistics
async fn show_stats(preload: bool) -> Result<()> {
    let app = App::build().await?;
    if preload {
        app.resolver.preload_all().await?;
    }

    let stats = app.resolver.stats().await;
    println!("Total:       {}", stats.total);
    println!("Loaded:      {}", stats.loaded);
    println!("Cached URIs: {}", stats.cached_uri_count);
    Ok(())
}

/// Build the request for a share target, with the clip id when it is a bundled clip
///
/// Catalog ids win over paths; an id without a bundled payload is an error
/// rather than a lookup on disk.
fn share_request_for(
    resolver: &AssetResolver,
    catalog: &Catalog,
    target: &str,
    title: Option<String>,
) -> Result<(ShareRequest, Option<String>)> {
    if let Some((entry, handle)) = resolver.entry(target).zip(resolver.handle_for(target)) {
        return Ok((ShareRequest::for_entry(entry, handle), Some(entry.id.clone())));
    }

    if let Some(entry) = catalog.get(target) {
        anyhow::bail!(
            "Clip '{}' has no bundled payload ({}); run `clipshare validate`",
            entry.id,
            entry.filename
        );
    }

    let title = title.unwrap_or_else(|| target.to_string());
    Ok((ShareRequest::location(target, title), None))
}

/// Share a clip id, URL or file path
async fn share(
    target: &str,
    title: Option<String>,
    mime_type: Option<String>,
    json: bool,
    show_log: bool,
    export_log: bool,
) -> Result<()> {
    let app = App::build().await?;
    let orchestrator = app.orchestrator();

    let (mut request, clip_id) = share_request_for(&app.resolver, &app.catalog, target, title)?;
    if let Some(mime_type) = mime_type {
        request = request.with_mime_type(mime_type);
    }

    let outcome = orchestrator.share(&request).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if outcome.success {
        println!("Shared via {}", outcome.method);
        if let Some(path) = &outcome.destination_path {
            println!("Copy: {}", path.display());
        }
    } else {
        eprintln!(
            "Share failed via {}: {}",
            outcome.method,
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }

    if outcome.success {
        if let Some(id) = &clip_id {
            let path = app.config.favorites_path();
            let mut favorites = Favorites::load(&path).await?;
            favorites.record_share(id);
            favorites.save(&path).await?;
        }
    }

    if show_log {
        eprintln!("\n{}", app.log.render());
    }
    if export_log {
        let path = app.log.export_to_file().await?;
        eprintln!("Debug log exported to {}", path.display());
    }

    if !outcome.success {
        std::process::exit(1);
    }

    Ok(())
}

/// Toggle the favorite flag on a clip
async fn toggle_favorite(id: &str) -> Result<()> {
    let app = App::build().await?;
    let entry = app
        .catalog
        .get(id)
        .with_context(|| format!("Clip not found: {}", id))?;

    let path = app.config.favorites_path();
    let mut favorites = Favorites::load(&path).await?;
    let now_favorite = favorites.toggle(&entry.id);
    favorites.save(&path).await?;

    if now_favorite {
        println!("Added '{}' to favorites", entry.title);
    } else {
        println!("Removed '{}' from favorites", entry.title);
    }

    Ok(())
}

/// List favorite clips
async fn list_favorites() -> Result<()> {
    let app = App::build().await?;
    let favorites = Favorites::load(&app.config.favorites_path()).await?;
    let ids = favorites.favorite_ids();

    if ids.is_empty() {
        println!("No favorites yet");
        return Ok(());
    }

    print_entry_header();
    for id in ids {
        match app.catalog.get(id) {
            Some(entry) => print_entry_row(entry, true),
            None => println!("* {:<24} (no longer in catalog)", id),
        }
    }

    Ok(())
}

/// Run the sharing self-test
async fn diagnose(share_test: bool) -> Result<()> {
    let app = App::build().await?;
    let report = if share_test {
        run_diagnostics_with_share(&app.orchestrator()).await
    } else {
        run_diagnostics(app.fs.as_ref(), app.platform.as_ref(), &app.log).await
    };

    println!("Platform:           {}", report.platform);
    println!("Sharing available:  {}", report.sharing_available);
    println!("File system access: {}", report.file_system_access);
    if let Some(error) = &report.file_system_error {
        println!("File system error:  {}", error);
    }
    for outcome in &report.test_results {
        println!("Test share:         {}", outcome.summary());
    }

    let stats = app.resolver.stats().await;
    println!("Resolvable clips:   {}", stats.total);

    if !report.is_healthy() {
        std::process::exit(1);
    }

    Ok(())
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let config = config::config()?;

    println!("Home:      {}", config.home.display());
    println!("Assets:    {}", config.assets.display());
    println!("Catalog:   {}", config.catalog.display());
    println!("Cache:     {}", config.cache.display());
    println!("Shared:    {}", config.shared.display());
    match &config.config_file {
        Some(path) => println!("Config:    {}", path.display()),
        None => println!("Config:    (defaults)"),
    }
    println!("Share cmd: {} {}", config.share.command, config.share.args.join(" "));
    if let Some(text_command) = &config.share.text_command {
        println!("Text cmd:  {}", text_command);
    }
    println!("Timeout:   {}s", config.share.timeout_seconds);
    println!("Log cap:   {}", config.debug_log.capacity);
    if let Some(url) = &config.remote_base_url {
        println!("Remote:    {}", url);
    }

    Ok(())
}

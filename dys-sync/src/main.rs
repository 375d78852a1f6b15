//! dys-sync - add tracks identified on Do You radio to a Spotify playlist
//!
//! Usage: `dys-sync [DATE]`
//!
//! Without arguments, tracks played today are synced. A DATE selects an
//! archived day instead, for backfilling after a failed run.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dys_common::config::{load_toml_config, ConfigLayout};
use dys_sync::config::SyncSettings;

#[derive(Debug, Parser)]
#[command(version, about = "Add tracks identified on Do You radio to a Spotify playlist")]
struct Cli {
    /// Archived date to sync instead of today
    date: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Step 1: Resolve configuration directory and bootstrap config
    let layout = ConfigLayout::resolve()?;
    layout
        .ensure_directory_exists()
        .with_context(|| format!("Failed to create {}", layout.root().display()))?;
    let toml_config = load_toml_config(&layout.config_file_path())?;

    // Initialize tracing (RUST_LOG wins over the configured level)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&toml_config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting dys-sync");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Configuration directory: {}", layout.root().display());

    let settings = SyncSettings::resolve(&layout, &toml_config)?;

    // Step 2: Credentials (interactive login on first run)
    let credentials = dys_sync::auth::ensure_credentials(&layout.credentials_path())
        .await
        .context("Error loading credentials")?;

    // Step 3: Track store
    let store = dys_sync::store::open_store(&settings)
        .await
        .context("Error initializing track store")?;

    // Step 4: Run the pipeline
    let orchestrator = dys_sync::build_orchestrator(&settings, &credentials.access_token, store)?;
    let report = orchestrator
        .run(cli.date.as_deref())
        .await
        .context("An error occurred when updating the playlist")?;

    info!(
        candidates = report.candidates,
        resolved = report.resolved,
        added = report.tracks_submitted,
        "Playlist update complete"
    );

    Ok(())
}

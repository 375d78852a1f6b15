//! dys-sync library interface
//!
//! Resolves tracks identified on the Do You radio broadcast to Spotify track
//! ids and appends the ones not seen before to a playlist.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use crate::error::{SyncError, SyncResult};

use crate::config::SyncSettings;
use crate::services::{
    LinkResolver, ResolutionPool, SpotifyPlaylistClient, SyncOrchestrator, TrackIdClient,
};
use crate::store::TrackStore;
use std::sync::Arc;

/// Wire the production clients into an orchestrator
pub fn build_orchestrator(
    settings: &SyncSettings,
    access_token: &str,
    store: Arc<dyn TrackStore>,
) -> anyhow::Result<SyncOrchestrator> {
    let source = TrackIdClient::new(&settings.track_id_api_url)?;
    let resolver = LinkResolver::new(settings.lookup_timeout, settings.lookup_rate_per_second)?;
    let sink = SpotifyPlaylistClient::new(
        services::playlist_client::SPOTIFY_API_BASE_URL,
        access_token,
        &settings.playlist_id,
    )?;

    let pool = ResolutionPool::new(Arc::new(resolver), settings.resolve_concurrency);

    Ok(SyncOrchestrator::new(
        Arc::new(source),
        pool,
        Arc::new(sink),
        store,
    ))
}

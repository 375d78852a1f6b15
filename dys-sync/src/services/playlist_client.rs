//! Playlist API client
//!
//! Appends tracks to the configured playlist, at most
//! [`MAX_TRACKS_PER_REQUEST`] per call.

use super::paginator::MAX_TRACKS_PER_REQUEST;
use crate::models::TrackId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const SPOTIFY_API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Playlist API errors
#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Access token rejected")]
    Unauthorized,

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Too many tracks in one request: {0} (max 100)")]
    TooManyTracks(usize),
}

/// Destination of submitted pages
#[async_trait]
pub trait PlaylistSink: Send + Sync {
    /// Append one page of tracks
    async fn add_tracks(&self, track_ids: &[TrackId]) -> Result<(), PlaylistError>;
}

#[derive(Debug, Serialize)]
struct AddTracksRequest {
    uris: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AddTracksResponse {
    snapshot_id: Option<String>,
}

/// Authenticated client for one playlist
pub struct SpotifyPlaylistClient {
    http_client: reqwest::Client,
    api_base: String,
    access_token: String,
    playlist_id: String,
}

impl SpotifyPlaylistClient {
    pub fn new(
        api_base: impl Into<String>,
        access_token: impl Into<String>,
        playlist_id: impl Into<String>,
    ) -> Result<Self, PlaylistError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PlaylistError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            playlist_id: playlist_id.into(),
        })
    }

    pub fn playlist_id(&self) -> &str {
        &self.playlist_id
    }
}

#[async_trait]
impl PlaylistSink for SpotifyPlaylistClient {
    async fn add_tracks(&self, track_ids: &[TrackId]) -> Result<(), PlaylistError> {
        if track_ids.is_empty() {
            return Ok(());
        }
        if track_ids.len() > MAX_TRACKS_PER_REQUEST {
            return Err(PlaylistError::TooManyTracks(track_ids.len()));
        }

        let url = format!("{}/playlists/{}/tracks", self.api_base, self.playlist_id);
        let request = AddTracksRequest {
            uris: track_ids.iter().map(TrackId::to_uri).collect(),
        };

        tracing::info!(
            count = track_ids.len(),
            playlist_id = %self.playlist_id,
            "Adding tracks to playlist"
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| PlaylistError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PlaylistError::Unauthorized);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PlaylistError::ApiError(status.as_u16(), error_text));
        }

        // Snapshot id is informational only
        let snapshot = response
            .json::<AddTracksResponse>()
            .await
            .ok()
            .and_then(|r| r.snapshot_id);
        tracing::debug!(snapshot_id = ?snapshot, "Playlist updated");

        Ok(())
    }
}

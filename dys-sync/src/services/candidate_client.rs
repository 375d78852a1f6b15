//! Track identification API client
//!
//! Fetches tracks identified on today's broadcast (`/today`) or on an
//! archived date (`/archive/<date>`), used to backfill after a failed run.

use crate::models::{Candidate, CandidateResponse};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("do-you-spotify/", env!("CARGO_PKG_VERSION"));

/// Candidate source errors
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Supplier of candidate tracks for one run
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Candidates for today, or for `date` when given
    async fn fetch_candidates(&self, date: Option<&str>) -> Result<Vec<Candidate>, SourceError>;
}

/// HTTP client for the track identification API
pub struct TrackIdClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl TrackIdClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SourceError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, date: Option<&str>) -> String {
        match date {
            Some(date) => format!("{}/archive/{}", self.base_url, date),
            None => format!("{}/today", self.base_url),
        }
    }
}

#[async_trait]
impl CandidateSource for TrackIdClient {
    async fn fetch_candidates(&self, date: Option<&str>) -> Result<Vec<Candidate>, SourceError> {
        match date {
            Some(date) => tracing::info!(date = %date, "Date override provided, fetching tracks played on archived date"),
            None => tracing::info!(
                today = %chrono::Local::now().format("%d/%m/%Y"),
                "Fetching tracks played today"
            ),
        }

        let url = self.endpoint(date);
        tracing::debug!(url = %url, "Calling track identification API");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SourceError::ApiError(status.as_u16(), error_text));
        }

        let body: CandidateResponse = response
            .json()
            .await
            .map_err(|e| SourceError::ParseError(e.to_string()))?;

        tracing::info!(tracks = body.tracks.len(), "Successfully fetched tracks");
        Ok(body.tracks)
    }
}

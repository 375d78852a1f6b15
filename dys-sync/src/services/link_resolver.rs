//! Song-link resolver
//!
//! Fetches a candidate's lookup page and extracts the playlist track id from
//! the first `https://open.spotify.com/track/<id>` URL in the body.
//!
//! "Not found" (non-success status, no matching URL) is a normal outcome,
//! distinct from a transport failure. Lookups are rate-limited and bounded by
//! a per-request timeout so one slow link cannot stall the whole pool.

use crate::models::TrackId;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("do-you-spotify/", env!("CARGO_PKG_VERSION"));

static TRACK_URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    // Safe: pattern is a compile-time constant
    Regex::new(r"https?://open\.spotify\.com/track/([a-zA-Z0-9]+)").unwrap()
});

/// Link resolver errors (transport level)
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Lookup timed out: {0}")]
    Timeout(String),

    #[error("Failed to read response body: {0}")]
    BodyError(String),
}

/// Outcome of a lookup that reached the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(TrackId),
    /// No track id could be extracted; carries the reason for logging
    NotFound(String),
}

/// Turns one lookup link into zero or one track id
#[async_trait]
pub trait TrackResolver: Send + Sync {
    async fn resolve(&self, link: &str) -> Result<Resolution, ResolveError>;
}

/// Extract the first track id from a page body
pub fn extract_track_id(body: &str) -> Option<TrackId> {
    TRACK_URL_PATTERN
        .captures(body)
        .and_then(|caps| caps.get(1))
        .and_then(|m| TrackId::new(m.as_str()).ok())
}

/// HTTP implementation of [`TrackResolver`]
pub struct LinkResolver {
    http_client: reqwest::Client,
    rate_limiter: governor::DefaultDirectRateLimiter,
}

impl LinkResolver {
    pub fn new(timeout: Duration, requests_per_second: u32) -> Result<Self, ResolveError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ResolveError::NetworkError(e.to_string()))?;

        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = governor::RateLimiter::direct(governor::Quota::per_second(rate));

        Ok(Self {
            http_client,
            rate_limiter,
        })
    }
}

#[async_trait]
impl TrackResolver for LinkResolver {
    async fn resolve(&self, link: &str) -> Result<Resolution, ResolveError> {
        self.rate_limiter.until_ready().await;

        tracing::debug!(url = %link, "Fetching song link");

        let response = self.http_client.get(link).send().await.map_err(|e| {
            if e.is_timeout() {
                ResolveError::Timeout(link.to_string())
            } else {
                ResolveError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Ok(Resolution::NotFound(format!(
                "unable to fetch content from {} (status {})",
                link,
                status.as_u16()
            )));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ResolveError::Timeout(link.to_string())
            } else {
                ResolveError::BodyError(e.to_string())
            }
        })?;

        match extract_track_id(&body) {
            Some(track_id) => Ok(Resolution::Resolved(track_id)),
            None => Ok(Resolution::NotFound(
                "could not match Spotify track URL".to_string(),
            )),
        }
    }
}

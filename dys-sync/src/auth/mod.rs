//! Credential layer for the playlist API
//!
//! Loads the stored token at startup, refreshing it when expired, and falls
//! back to the interactive login when no credential file exists yet.

pub mod credentials;
pub mod oauth;

pub use credentials::{ClientApp, Credentials};
pub use oauth::{acquire_interactively, acquire_with_callback_at, OAuthClient};

use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Credential errors (all startup-fatal)
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed credential file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Missing client credentials: set {0}")]
    MissingClientCredentials(String),

    #[error("Token request failed: {0}")]
    TokenRequest(String),

    #[error("Token endpoint error {0}: {1}")]
    ApiError(u16, String),

    #[error("Authorization denied: {0}")]
    Denied(String),

    #[error("State mismatch in authorization callback")]
    StateMismatch,

    #[error("Callback server error: {0}")]
    CallbackServer(String),
}

/// Load usable credentials, acquiring or refreshing them as needed
///
/// Client app credentials are only required when the browser login or a
/// refresh is actually needed.
pub async fn ensure_credentials(credentials_path: &Path) -> Result<Credentials, AuthError> {
    if !tokio::fs::try_exists(credentials_path).await? {
        info!("Fetching credentials...");
        let client = OAuthClient::new(ClientApp::from_env()?);
        return acquire_interactively(&client, credentials_path).await;
    }

    let credentials = Credentials::load(credentials_path).await?;
    if !credentials.is_expired(chrono::Utc::now()) {
        return Ok(credentials);
    }

    info!("Stored access token expired, refreshing");
    let client = OAuthClient::new(ClientApp::from_env()?);
    refresh_and_persist(&client, &credentials, credentials_path).await
}

/// Refresh an expired token and write it back to the credential file
pub async fn refresh_and_persist(
    client: &OAuthClient,
    credentials: &Credentials,
    credentials_path: &Path,
) -> Result<Credentials, AuthError> {
    let refreshed = client.refresh(credentials).await?;
    refreshed.persist(credentials_path).await?;
    Ok(refreshed)
}

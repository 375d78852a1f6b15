//! Persisted OAuth credentials for the playlist API

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::AuthError;

/// Refresh this long before the recorded expiry
const EXPIRY_SKEW_SECS: i64 = 60;

pub const CLIENT_ID_ENV_VAR: &str = "SPOTIFY_ID";
pub const CLIENT_SECRET_ENV_VAR: &str = "SPOTIFY_SECRET";

/// OAuth token as stored in `credentials.json`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Credentials {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Credentials {
    pub async fn load(path: &Path) -> Result<Self, AuthError> {
        let content = tokio::fs::read_to_string(path).await?;
        let credentials: Credentials = serde_json::from_str(&content)?;

        if credentials.access_token.trim().is_empty() {
            return Err(AuthError::InvalidCredentials(format!(
                "{} has no access token",
                path.display()
            )));
        }

        Ok(credentials)
    }

    pub async fn persist(&self, path: &Path) -> Result<(), AuthError> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        tracing::debug!(path = %path.display(), "Credentials persisted");
        Ok(())
    }

    /// Whether the token expires within the skew margin of `now`
    ///
    /// Tokens without an expiry never expire. Expiries before the year 2000
    /// are zero-value placeholders and are treated as "no expiry".
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) if expiry.timestamp() > 946_684_800 => {
                expiry - Duration::seconds(EXPIRY_SKEW_SECS) <= now
            }
            _ => false,
        }
    }
}

/// Registered application credentials used for the token endpoint
#[derive(Debug, Clone)]
pub struct ClientApp {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientApp {
    /// Read `SPOTIFY_ID` / `SPOTIFY_SECRET`
    pub fn from_env() -> Result<Self, AuthError> {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AuthError::MissingClientCredentials(name.to_string()))
        };

        Ok(Self {
            client_id: read(CLIENT_ID_ENV_VAR)?,
            client_secret: read(CLIENT_SECRET_ENV_VAR)?,
        })
    }
}

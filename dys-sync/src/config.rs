//! Configuration resolution for the sync run
//!
//! Every setting resolves with priority ENV → TOML → built-in default.
//! The playlist id has no default and must come from one of the first two.

use crate::store::sql_store::{DEFAULT_TABLE_NAME, TABLE_NAME_ENV_VAR};
use dys_common::config::{ConfigLayout, TomlConfig};
use dys_common::{Error, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

pub const PLAYLIST_ID_ENV_VAR: &str = "SPOTIFY_PLAYLIST_ID";
pub const STORE_BACKEND_ENV_VAR: &str = "DYS_STORE_BACKEND";
pub const STORE_DATABASE_URL_ENV_VAR: &str = "DYS_STORE_DATABASE_URL";
pub const RESOLVE_CONCURRENCY_ENV_VAR: &str = "DYS_RESOLVE_CONCURRENCY";
pub const LOOKUP_TIMEOUT_ENV_VAR: &str = "DYS_LOOKUP_TIMEOUT_SECS";
pub const LOOKUP_RATE_ENV_VAR: &str = "DYS_LOOKUP_RATE_PER_SECOND";
pub const TRACK_ID_API_URL_ENV_VAR: &str = "DYS_TRACK_ID_API_URL";

pub const DEFAULT_TRACK_ID_API_URL: &str =
    "https://3rqvxp6o77.execute-api.eu-central-1.amazonaws.com/api";
pub const DEFAULT_RESOLVE_CONCURRENCY: usize = 8;
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_LOOKUP_RATE_PER_SECOND: u32 = 10;

/// Which track store backend to open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Database table (default)
    Sql,
    /// Local JSON document
    File,
}

impl FromStr for StoreBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sql" | "db" | "database" => Ok(StoreBackend::Sql),
            "file" | "fs" | "json" => Ok(StoreBackend::File),
            other => Err(Error::Config(format!(
                "Unknown track store backend '{}' (expected 'sql' or 'file')",
                other
            ))),
        }
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub playlist_id: String,
    pub store_backend: StoreBackend,
    pub store_table_name: String,
    pub store_database_url: String,
    pub store_file_path: PathBuf,
    pub resolve_concurrency: usize,
    pub lookup_timeout: Duration,
    pub lookup_rate_per_second: u32,
    pub track_id_api_url: String,
}

impl SyncSettings {
    /// Resolve settings from the environment, TOML config and defaults
    pub fn resolve(layout: &ConfigLayout, toml_config: &TomlConfig) -> Result<Self> {
        let playlist_id = resolve_setting(
            PLAYLIST_ID_ENV_VAR,
            toml_config.playlist_id.clone(),
            None,
        )
        .ok_or_else(|| {
            Error::Config(format!(
                "Playlist id not configured. Set {} or playlist_id in {}",
                PLAYLIST_ID_ENV_VAR,
                layout.config_file_path().display()
            ))
        })?;

        let store_backend = resolve_setting(
            STORE_BACKEND_ENV_VAR,
            toml_config.store_backend.clone(),
            Some("sql".to_string()),
        )
        .map(|s| s.parse::<StoreBackend>())
        .transpose()?
        .unwrap_or(StoreBackend::Sql);

        let store_table_name = resolve_setting(
            TABLE_NAME_ENV_VAR,
            toml_config.store_table_name.clone(),
            Some(DEFAULT_TABLE_NAME.to_string()),
        )
        .unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string());

        let default_db_url = format!("sqlite://{}", layout.track_store_db_path().display());
        let store_database_url = resolve_setting(
            STORE_DATABASE_URL_ENV_VAR,
            toml_config.store_database_url.clone(),
            Some(default_db_url.clone()),
        )
        .unwrap_or(default_db_url);

        let resolve_concurrency = resolve_parsed(
            RESOLVE_CONCURRENCY_ENV_VAR,
            toml_config.resolve_concurrency,
            DEFAULT_RESOLVE_CONCURRENCY,
        )?;
        if resolve_concurrency == 0 {
            return Err(Error::Config(format!("{} must be at least 1", RESOLVE_CONCURRENCY_ENV_VAR)));
        }

        let lookup_timeout_secs = resolve_parsed(
            LOOKUP_TIMEOUT_ENV_VAR,
            toml_config.lookup_timeout_secs,
            DEFAULT_LOOKUP_TIMEOUT_SECS,
        )?;
        if lookup_timeout_secs == 0 {
            return Err(Error::Config(format!("{} must be at least 1", LOOKUP_TIMEOUT_ENV_VAR)));
        }

        let lookup_rate_per_second = resolve_parsed(
            LOOKUP_RATE_ENV_VAR,
            toml_config.lookup_rate_per_second,
            DEFAULT_LOOKUP_RATE_PER_SECOND,
        )?;
        if lookup_rate_per_second == 0 {
            return Err(Error::Config(format!("{} must be at least 1", LOOKUP_RATE_ENV_VAR)));
        }

        let track_id_api_url = resolve_setting(
            TRACK_ID_API_URL_ENV_VAR,
            toml_config.track_id_api_url.clone(),
            Some(DEFAULT_TRACK_ID_API_URL.to_string()),
        )
        .unwrap_or_else(|| DEFAULT_TRACK_ID_API_URL.to_string());

        let settings = Self {
            playlist_id,
            store_backend,
            store_table_name,
            store_database_url,
            store_file_path: layout.track_store_path(),
            resolve_concurrency,
            lookup_timeout: Duration::from_secs(lookup_timeout_secs),
            lookup_rate_per_second,
            track_id_api_url,
        };

        info!(
            playlist_id = %settings.playlist_id,
            store_backend = ?settings.store_backend,
            resolve_concurrency = settings.resolve_concurrency,
            lookup_timeout_secs,
            "Sync settings resolved"
        );

        Ok(settings)
    }
}

/// Validate a setting value (non-empty, non-whitespace)
pub fn is_valid_value(value: &str) -> bool {
    !value.trim().is_empty()
}

/// ENV → TOML → default for string settings
fn resolve_setting(env_var: &str, toml_value: Option<String>, default: Option<String>) -> Option<String> {
    if let Ok(value) = std::env::var(env_var) {
        if is_valid_value(&value) {
            debug!("{} loaded from environment variable", env_var);
            return Some(value.trim().to_string());
        }
    }

    if let Some(value) = toml_value {
        if is_valid_value(&value) {
            debug!("{} loaded from TOML config", env_var);
            return Some(value.trim().to_string());
        }
    }

    default
}

/// ENV → TOML → default for numeric settings
fn resolve_parsed<T>(env_var: &str, toml_value: Option<T>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Ok(value) = std::env::var(env_var) {
        if is_valid_value(&value) {
            return value
                .trim()
                .parse::<T>()
                .map_err(|e| Error::Config(format!("Invalid {}='{}': {}", env_var, value, e)));
        }
    }

    Ok(toml_value.unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_backend_parsing() {
        assert_eq!("sql".parse::<StoreBackend>().unwrap(), StoreBackend::Sql);
        assert_eq!(" FILE ".parse::<StoreBackend>().unwrap(), StoreBackend::File);
        assert!("dynamo".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_is_valid_value() {
        assert!(is_valid_value("abc"));
        assert!(!is_valid_value(""));
        assert!(!is_valid_value("   "));
    }
}

//! Configuration directory layout and TOML bootstrap configuration
//!
//! Everything the tool persists locally lives under one per-user directory
//! (`~/.do-you-spotify` by default):
//!
//! - `credentials.json` - OAuth token for the playlist API
//! - `trackStore.json`  - local track store document
//! - `trackStore.db`    - default database for the table-backed track store
//! - `config.toml`      - optional bootstrap configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the per-user configuration directory (relative to the home directory)
pub const CONFIG_DIRECTORY_NAME: &str = ".do-you-spotify";

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV_VAR: &str = "DYS_CONFIG_DIR";

const CREDENTIALS_FILE_NAME: &str = "credentials.json";
const TRACK_STORE_FILE_NAME: &str = "trackStore.json";
const TRACK_STORE_DB_FILE_NAME: &str = "trackStore.db";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Resolved location of every file the tool keeps on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayout {
    root: PathBuf,
}

impl ConfigLayout {
    /// Layout rooted at an explicit directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the configuration directory
    ///
    /// Priority:
    /// 1. `DYS_CONFIG_DIR` environment variable
    /// 2. `~/.do-you-spotify`
    pub fn resolve() -> Result<Self> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV_VAR) {
            if !dir.trim().is_empty() {
                debug!(dir = %dir, "Configuration directory overridden by environment");
                return Ok(Self::new(dir));
            }
        }

        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        Ok(Self::new(home.join(CONFIG_DIRECTORY_NAME)))
    }

    /// Create the configuration directory (and parents) if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root)?;
            info!("Created configuration directory: {}", self.root.display());
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.root.join(CREDENTIALS_FILE_NAME)
    }

    pub fn track_store_path(&self) -> PathBuf {
        self.root.join(TRACK_STORE_FILE_NAME)
    }

    pub fn track_store_db_path(&self) -> PathBuf {
        self.root.join(TRACK_STORE_DB_FILE_NAME)
    }

    pub fn config_file_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }
}

/// Bootstrap configuration loaded from `config.toml`
///
/// Every field is optional; environment variables take precedence and
/// built-in defaults fill whatever neither source provides.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Target playlist identifier
    #[serde(default)]
    pub playlist_id: Option<String>,

    /// Track store backend: "sql" or "file"
    #[serde(default)]
    pub store_backend: Option<String>,

    /// Table name for the table-backed track store
    #[serde(default)]
    pub store_table_name: Option<String>,

    /// Database URL for the table-backed track store
    #[serde(default)]
    pub store_database_url: Option<String>,

    /// Maximum number of link lookups in flight
    #[serde(default)]
    pub resolve_concurrency: Option<usize>,

    /// Per-lookup timeout in seconds
    #[serde(default)]
    pub lookup_timeout_secs: Option<u64>,

    /// Maximum link lookups started per second
    #[serde(default)]
    pub lookup_rate_per_second: Option<u32>,

    /// Base URL of the track identification API
    #[serde(default)]
    pub track_id_api_url: Option<String>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Load TOML configuration, returning defaults when the file does not exist
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "No TOML config file, using defaults");
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

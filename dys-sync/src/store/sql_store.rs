//! Table-backed track store
//!
//! Each recorded id is one row `(track_id TEXT PRIMARY KEY, date_added TEXT)`.
//! The table is provisioned on first use; an existing table is reused as-is.

use super::{date_added_now, TrackStore};
use crate::models::TrackId;
use async_trait::async_trait;
use dys_common::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Default table name
pub const DEFAULT_TABLE_NAME: &str = "DoYouTrackIdStore";

/// Environment variable overriding the table name
pub const TABLE_NAME_ENV_VAR: &str = "DO_YOU_TRACK_STORE_TABLE_NAME";

/// Database-table track store
pub struct SqlTrackStore {
    db: Pool<Sqlite>,
    table_name: String,
}

impl SqlTrackStore {
    /// Connect to the database and provision the table if it does not exist
    pub async fn connect(database_url: &str, table_name: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let db = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        debug!(url = %database_url, "Track store database connected");
        Self::from_pool(db, table_name).await
    }

    /// Use an existing pool, provisioning the table if needed
    pub async fn from_pool(db: Pool<Sqlite>, table_name: &str) -> Result<Self> {
        validate_table_name(table_name)?;

        let store = Self {
            db,
            table_name: table_name.to_string(),
        };
        store.create_table_if_missing().await?;

        Ok(store)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn table_exists(&self) -> Result<bool> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(&self.table_name)
                .fetch_optional(&self.db)
                .await?;

        Ok(row.is_some())
    }

    async fn create_table_if_missing(&self) -> Result<()> {
        if self.table_exists().await? {
            info!("Table {} already exists, skipping creation", self.table_name);
            return Ok(());
        }

        info!("Table {} does not exist, bootstrapping", self.table_name);

        // IF NOT EXISTS keeps a concurrent bootstrap from failing
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (
                track_id TEXT PRIMARY KEY NOT NULL,
                date_added TEXT NOT NULL
            )",
            self.table_name
        );
        sqlx::query(&ddl).execute(&self.db).await?;

        info!("Created the table {}", self.table_name);
        Ok(())
    }
}

#[async_trait]
impl TrackStore for SqlTrackStore {
    async fn has(&self, id: &TrackId) -> Result<bool> {
        let query = format!(
            "SELECT track_id FROM \"{}\" WHERE track_id = ?",
            self.table_name
        );

        let row: Option<(String,)> = sqlx::query_as(&query)
            .bind(id.as_str())
            .fetch_optional(&self.db)
            .await?;

        Ok(row.is_some())
    }

    async fn add(&self, id: &TrackId) -> Result<()> {
        let query = format!(
            "INSERT INTO \"{}\" (track_id, date_added) VALUES (?, ?)
             ON CONFLICT(track_id) DO UPDATE SET date_added = excluded.date_added",
            self.table_name
        );

        sqlx::query(&query)
            .bind(id.as_str())
            .bind(date_added_now())
            .execute(&self.db)
            .await?;

        debug!(track_id = %id, table = %self.table_name, "Added track to store");
        Ok(())
    }

    /// Writes one row per id; a failed id is logged and the rest still run
    async fn add_all(&self, ids: &[TrackId]) -> Result<()> {
        let mut failed = 0usize;

        for id in ids {
            if let Err(e) = self.add(id).await {
                warn!(track_id = %id, error = %e, "Unable to add track to store");
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(Error::PartialWrite {
                failed,
                attempted: ids.len(),
            });
        }

        info!(
            count = ids.len(),
            table = %self.table_name,
            "Recorded tracks in store"
        );
        Ok(())
    }
}

/// Table names are interpolated into SQL, so only plain identifiers are accepted
fn validate_table_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() <= 128
        && name
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_')
            .unwrap_or(false)
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(Error::Config(format!("Invalid track store table name: {:?}", name)))
    }
}

//! Track store: persistent record of track ids already added to the playlist
//!
//! Two interchangeable backends implement [`TrackStore`]:
//! - [`SqlTrackStore`] - one row per track id in a database table
//! - [`FileTrackStore`] - one JSON document mapping track id → date added
//!
//! Once `add`/`add_all` succeeds for an id, `has` reports it, including from
//! a store opened later by another process.

pub mod file_store;
pub mod sql_store;

pub use file_store::FileTrackStore;
pub use sql_store::SqlTrackStore;

use crate::config::{StoreBackend, SyncSettings};
use crate::models::TrackId;
use async_trait::async_trait;
use dys_common::Result;
use std::sync::Arc;

/// Record of track ids already submitted to the playlist
#[async_trait]
pub trait TrackStore: Send + Sync {
    /// Whether the id was recorded by a previous (or the current) run
    async fn has(&self, id: &TrackId) -> Result<bool>;

    /// Record one id
    async fn add(&self, id: &TrackId) -> Result<()>;

    /// Record many ids
    async fn add_all(&self, ids: &[TrackId]) -> Result<()>;
}

/// Open the backend selected by configuration
pub async fn open_store(settings: &SyncSettings) -> Result<Arc<dyn TrackStore>> {
    match settings.store_backend {
        StoreBackend::Sql => {
            let store = SqlTrackStore::connect(
                &settings.store_database_url,
                &settings.store_table_name,
            )
            .await?;
            Ok(Arc::new(store))
        }
        StoreBackend::File => {
            let store = FileTrackStore::open(&settings.store_file_path).await?;
            Ok(Arc::new(store))
        }
    }
}

/// Timestamp recorded alongside each id
pub(crate) fn date_added_now() -> String {
    chrono::Utc::now().to_rfc3339()
}

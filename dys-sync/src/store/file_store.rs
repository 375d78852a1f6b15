//! Local track store backed by a single JSON document
//!
//! The whole record is held in memory and rewritten as a full snapshot after
//! every mutation. Writes go to a sibling temp file first and are renamed
//! into place so a crash never leaves a truncated document.

use super::{date_added_now, TrackStore};
use crate::models::TrackId;
use async_trait::async_trait;
use dys_common::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Track id → date added
type TrackRecord = BTreeMap<String, String>;

/// JSON-document track store
pub struct FileTrackStore {
    file_path: PathBuf,
    record: Mutex<TrackRecord>,
}

impl FileTrackStore {
    /// Load the store document, creating an empty one if missing
    pub async fn open(file_path: &Path) -> Result<Self> {
        let record = if tokio::fs::try_exists(file_path).await? {
            let record = load_record(file_path).await?;
            info!(
                path = %file_path.display(),
                tracks = record.len(),
                "Loaded track store document"
            );
            record
        } else {
            let record = TrackRecord::new();
            write_record(file_path, &record).await?;
            info!(path = %file_path.display(), "Initialised empty track store document");
            record
        };

        Ok(Self {
            file_path: file_path.to_path_buf(),
            record: Mutex::new(record),
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Number of recorded track ids
    pub async fn len(&self) -> usize {
        self.record.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.record.lock().await.is_empty()
    }
}

#[async_trait]
impl TrackStore for FileTrackStore {
    async fn has(&self, id: &TrackId) -> Result<bool> {
        Ok(self.record.lock().await.contains_key(id.as_str()))
    }

    async fn add(&self, id: &TrackId) -> Result<()> {
        let mut record = self.record.lock().await;
        let mut snapshot = record.clone();
        snapshot.insert(id.to_string(), date_added_now());

        write_record(&self.file_path, &snapshot).await?;
        *record = snapshot;
        Ok(())
    }

    async fn add_all(&self, ids: &[TrackId]) -> Result<()> {
        let mut record = self.record.lock().await;
        let mut snapshot = record.clone();
        let mut inserted = 0usize;

        for id in ids {
            if !snapshot.contains_key(id.as_str()) {
                snapshot.insert(id.to_string(), date_added_now());
                inserted += 1;
            }
        }

        debug!(
            requested = ids.len(),
            inserted,
            "Writing track store snapshot"
        );

        // Memory only reflects what reached disk
        write_record(&self.file_path, &snapshot).await?;
        *record = snapshot;
        Ok(())
    }
}

async fn load_record(path: &Path) -> Result<TrackRecord> {
    let content = tokio::fs::read_to_string(path).await?;

    // Older versions created the document as a zero-byte placeholder
    if content.trim().is_empty() {
        return Ok(TrackRecord::new());
    }

    Ok(serde_json::from_str(&content)?)
}

async fn write_record(path: &Path, record: &TrackRecord) -> Result<()> {
    let content = serde_json::to_string_pretty(record)?;

    let mut temp_path = path.as_os_str().to_owned();
    temp_path.push(".tmp");
    let temp_path = PathBuf::from(temp_path);

    tokio::fs::write(&temp_path, content).await?;
    tokio::fs::rename(&temp_path, path).await?;

    Ok(())
}

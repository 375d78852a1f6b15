//! Filtering of resolved track ids against the track store

use crate::models::TrackId;
use crate::store::TrackStore;
use dys_common::Result;
use std::collections::HashSet;
use tracing::{debug, info};

/// Keep only ids the store has not recorded, preserving input order
///
/// Repeats within `ids` are not collapsed here; see [`unique_in_order`].
/// A store lookup error aborts the filter.
pub async fn filter_new(ids: &[TrackId], store: &dyn TrackStore) -> Result<Vec<TrackId>> {
    info!(resolved = ids.len(), "Filtering out tracks already in playlist");

    let mut new_ids = Vec::with_capacity(ids.len());
    for id in ids {
        if store.has(id).await? {
            debug!(track_id = %id, "Track already recorded, skipping");
        } else {
            new_ids.push(id.clone());
        }
    }

    info!(
        resolved = ids.len(),
        new = new_ids.len(),
        "Tracks to add to playlist"
    );

    Ok(new_ids)
}

/// Collapse repeated ids, keeping the first occurrence of each
pub fn unique_in_order(ids: Vec<TrackId>) -> Vec<TrackId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

//! Error types for a sync run
//!
//! Single-candidate lookup failures never appear here: the resolution pool
//! absorbs them. Everything below ends the run.

use crate::services::candidate_client::SourceError;
use crate::services::playlist_client::PlaylistError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Candidate list could not be fetched
    #[error("Failed to fetch candidates: {0}")]
    Source(#[from] SourceError),

    /// A page was rejected; earlier pages stay submitted
    #[error("Failed to add page {page} of {pages} to the playlist: {source}")]
    Submit {
        page: usize,
        pages: usize,
        #[source]
        source: PlaylistError,
    },

    /// Track store lookup or write failed
    #[error("Track store error: {0}")]
    Store(#[from] dys_common::Error),
}

pub type SyncResult<T> = Result<T, SyncError>;

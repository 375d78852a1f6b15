//! Sync orchestrator
//!
//! Sequences one run:
//! fetch candidates → resolve → collapse repeats → deduplicate → paginate →
//! submit each page → record submitted ids.
//!
//! A failed page aborts the run. Pages submitted before it stay in the
//! playlist and their ids are NOT recorded, so the next run resubmits them
//! (at-least-once).

use super::candidate_client::CandidateSource;
use super::deduplicator::{filter_new, unique_in_order};
use super::paginator::{paginate, MAX_TRACKS_PER_REQUEST};
use super::playlist_client::PlaylistSink;
use super::resolution_pool::ResolutionPool;
use crate::error::{SyncError, SyncResult};
use crate::models::{SyncPhase, SyncReport, SyncRun};
use crate::store::TrackStore;
use std::sync::Arc;
use tracing::{error, info};

pub struct SyncOrchestrator {
    source: Arc<dyn CandidateSource>,
    pool: ResolutionPool,
    sink: Arc<dyn PlaylistSink>,
    store: Arc<dyn TrackStore>,
    page_size: usize,
}

impl SyncOrchestrator {
    pub fn new(
        source: Arc<dyn CandidateSource>,
        pool: ResolutionPool,
        sink: Arc<dyn PlaylistSink>,
        store: Arc<dyn TrackStore>,
    ) -> Self {
        Self {
            source,
            pool,
            sink,
            store,
            page_size: MAX_TRACKS_PER_REQUEST,
        }
    }

    /// Override the page size (clamped to 1..=100)
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_TRACKS_PER_REQUEST);
        self
    }

    /// Execute one run for today, or for `date` when given
    pub async fn run(&self, date: Option<&str>) -> SyncResult<SyncReport> {
        let mut run = SyncRun::new(date.map(str::to_string));
        let mut report = SyncReport::default();

        info!(run_id = %run.run_id, date = ?date, "Beginning playlist update");

        match self.run_phases(&mut run, &mut report).await {
            Ok(()) => {
                run.transition_to(SyncPhase::Done);
                info!(
                    run_id = %run.run_id,
                    candidates = report.candidates,
                    resolved = report.resolved,
                    new = report.new,
                    pages = report.pages_submitted,
                    "Finished adding tracks to playlist"
                );
                Ok(report)
            }
            Err(e) => {
                let failed_in = run.phase;
                run.transition_to(SyncPhase::Failed);
                error!(
                    run_id = %run.run_id,
                    phase = ?failed_in,
                    error = %e,
                    "Playlist update failed"
                );
                Err(e)
            }
        }
    }

    async fn run_phases(&self, run: &mut SyncRun, report: &mut SyncReport) -> SyncResult<()> {
        // FETCH_CANDIDATES
        let candidates = self
            .source
            .fetch_candidates(run.date_override.as_deref())
            .await?;
        report.candidates = candidates.len();

        if candidates.is_empty() {
            info!(run_id = %run.run_id, "No candidates returned, nothing to do");
            return Ok(());
        }

        // RESOLVE
        run.transition_to(SyncPhase::Resolve);
        let resolved = self.pool.resolve_all(&candidates).await;
        report.resolved = resolved.len();

        let unique = unique_in_order(resolved);
        report.unique = unique.len();

        // DEDUPLICATE
        run.transition_to(SyncPhase::Deduplicate);
        let new_ids = filter_new(&unique, self.store.as_ref()).await?;
        report.new = new_ids.len();

        if new_ids.is_empty() {
            info!(run_id = %run.run_id, "All resolved tracks already in playlist");
            return Ok(());
        }

        // PAGINATE
        run.transition_to(SyncPhase::Paginate);
        let pages = paginate(&new_ids, self.page_size);
        let page_count = pages.len();
        info!(
            run_id = %run.run_id,
            tracks = new_ids.len(),
            pages = page_count,
            "There are tracks to add to playlist"
        );

        // SUBMIT_PAGE*
        for (index, page) in pages.iter().enumerate() {
            run.transition_to(SyncPhase::SubmitPage);
            self.sink
                .add_tracks(page)
                .await
                .map_err(|source| SyncError::Submit {
                    page: index + 1,
                    pages: page_count,
                    source,
                })?;

            report.pages_submitted += 1;
            report.tracks_submitted += page.len();
            info!(
                run_id = %run.run_id,
                page = format!("{}/{}", index + 1, page_count),
                tracks = page.len(),
                "Page added to playlist"
            );
        }

        // PERSIST_NEW_IDS
        run.transition_to(SyncPhase::PersistNewIds);
        self.store.add_all(&new_ids).await?;
        info!(run_id = %run.run_id, tracks = new_ids.len(), "Recorded new tracks in store");

        Ok(())
    }
}

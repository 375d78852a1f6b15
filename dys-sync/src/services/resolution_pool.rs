//! Resolution pool: bounded fan-out of link lookups
//!
//! One lookup per candidate with a link, at most `concurrency` in flight
//! (`futures::stream::buffer_unordered`). The pool completes when every
//! launched lookup has finished; failures are logged and skipped, never
//! surfaced to the caller.

use super::link_resolver::{Resolution, TrackResolver};
use crate::models::{Candidate, TrackId};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{info, warn};

pub struct ResolutionPool {
    resolver: Arc<dyn TrackResolver>,
    concurrency: usize,
}

impl ResolutionPool {
    pub fn new(resolver: Arc<dyn TrackResolver>, concurrency: usize) -> Self {
        Self {
            resolver,
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Resolve every candidate that has a lookup link
    ///
    /// Output order follows completion order, not input order.
    pub async fn resolve_all(&self, candidates: &[Candidate]) -> Vec<TrackId> {
        let total = candidates.len();
        info!(
            candidates = total,
            concurrency = self.concurrency,
            "Fetching Spotify IDs for candidates"
        );

        let resolved: Vec<TrackId> = stream::iter(candidates.iter().enumerate())
            .filter_map(|(index, candidate)| {
                let position = format!("{}/{}", index + 1, total);
                let launch = match candidate.lookup_link() {
                    Some(link) => Some((position, candidate, link.to_string())),
                    None => {
                        info!(
                            position = %position,
                            track = %candidate.tag(),
                            "Skipping track as song link is empty"
                        );
                        None
                    }
                };
                futures::future::ready(launch)
            })
            .map(|(position, candidate, link)| {
                let resolver = self.resolver.clone();
                async move {
                    match resolver.resolve(&link).await {
                        Ok(Resolution::Resolved(track_id)) => {
                            info!(
                                position = %position,
                                track = %candidate.tag(),
                                track_id = %track_id,
                                "Retrieved Spotify ID for track"
                            );
                            Some(track_id)
                        }
                        Ok(Resolution::NotFound(reason)) => {
                            info!(
                                position = %position,
                                track = %candidate.tag(),
                                reason = %reason,
                                "Could not retrieve Spotify ID for track, skipping"
                            );
                            None
                        }
                        Err(e) => {
                            warn!(
                                position = %position,
                                track = %candidate.tag(),
                                error = %e,
                                "Lookup failed for track, skipping"
                            );
                            None
                        }
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .filter_map(futures::future::ready)
            .collect()
            .await;

        info!(
            candidates = total,
            resolved = resolved.len(),
            "Finished fetching Spotify track IDs"
        );

        resolved
    }
}

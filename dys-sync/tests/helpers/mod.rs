//! Shared test utilities
//!
//! External HTTP services are stood in for by axum routers served on an
//! ephemeral local port.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use dys_sync::models::{Candidate, TrackId};
use dys_sync::services::{CandidateSource, PlaylistError, PlaylistSink, SourceError};
use dys_sync::store::TrackStore;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Serve `router` on 127.0.0.1 and return its base URL
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}", addr)
}

/// Lookup page body containing a track URL
pub fn song_page(track_id: &str) -> String {
    format!(
        r#"<html><body><a class="spotify" href="https://open.spotify.com/track/{}">Listen</a></body></html>"#,
        track_id
    )
}

pub fn ids(raw: &[&str]) -> Vec<TrackId> {
    raw.iter().map(|s| TrackId::new(*s).unwrap()).collect()
}

/// Candidate source returning a fixed list
pub struct FixedSource {
    pub candidates: Vec<Candidate>,
    pub requested_dates: Mutex<Vec<Option<String>>>,
}

impl FixedSource {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            requested_dates: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CandidateSource for FixedSource {
    async fn fetch_candidates(&self, date: Option<&str>) -> Result<Vec<Candidate>, SourceError> {
        self.requested_dates
            .lock()
            .unwrap()
            .push(date.map(str::to_string));
        Ok(self.candidates.clone())
    }
}

/// Candidate source that always fails
pub struct FailingSource;

#[async_trait]
impl CandidateSource for FailingSource {
    async fn fetch_candidates(&self, _date: Option<&str>) -> Result<Vec<Candidate>, SourceError> {
        Err(SourceError::ApiError(502, "bad gateway".to_string()))
    }
}

/// Playlist sink recording every page, optionally failing on one call
pub struct RecordingSink {
    pub pages: Mutex<Vec<Vec<TrackId>>>,
    calls: AtomicUsize,
    fail_on_call: Option<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            pages: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            fail_on_call: None,
        }
    }

    /// Fail the n-th call (1-based)
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::new()
        }
    }

    pub fn pages(&self) -> Vec<Vec<TrackId>> {
        self.pages.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaylistSink for RecordingSink {
    async fn add_tracks(&self, track_ids: &[TrackId]) -> Result<(), PlaylistError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(call) {
            return Err(PlaylistError::ApiError(500, "internal error".to_string()));
        }
        self.pages.lock().unwrap().push(track_ids.to_vec());
        Ok(())
    }
}

/// In-memory track store whose lookups or writes can be made to fail
#[derive(Default)]
pub struct FailingStore {
    ids: Mutex<HashSet<String>>,
    fail_has: bool,
    fail_writes: bool,
    pub write_attempts: AtomicUsize,
}

impl FailingStore {
    pub fn failing_lookups() -> Self {
        Self {
            fail_has: true,
            ..Self::default()
        }
    }

    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.ids.lock().unwrap().len()
    }

    fn unavailable() -> dys_common::Error {
        dys_common::Error::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "store unavailable",
        ))
    }
}

#[async_trait]
impl TrackStore for FailingStore {
    async fn has(&self, id: &TrackId) -> dys_common::Result<bool> {
        if self.fail_has {
            return Err(Self::unavailable());
        }
        Ok(self.ids.lock().unwrap().contains(id.as_str()))
    }

    async fn add(&self, id: &TrackId) -> dys_common::Result<()> {
        self.add_all(std::slice::from_ref(id)).await
    }

    async fn add_all(&self, ids: &[TrackId]) -> dys_common::Result<()> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(Self::unavailable());
        }
        let mut stored = self.ids.lock().unwrap();
        stored.extend(ids.iter().map(|id| id.to_string()));
        Ok(())
    }
}

//! HTTP client tests against local stand-in servers
//!
//! Covers the link resolver, the track identification API client and the
//! playlist API client.

mod helpers;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use dys_sync::models::Candidate;
use dys_sync::services::{
    CandidateSource, LinkResolver, PlaylistError, PlaylistSink, ResolveError, Resolution,
    SourceError, SpotifyPlaylistClient, TrackIdClient, TrackResolver,
};
use helpers::{ids, song_page, spawn_server};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Link resolver
// ============================================================================

async fn link_server() -> String {
    let router = Router::new()
        .route("/found", get(|| async { Html(song_page("7ouMYWpwJ422jRcDASZB7P")) }))
        .route(
            "/not-found",
            get(|| async { (StatusCode::NOT_FOUND, "missing").into_response() }),
        )
        .route("/no-match", get(|| async { Html("<html>nothing here</html>") }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Html(song_page("late"))
            }),
        );
    spawn_server(router).await
}

#[tokio::test]
async fn test_resolver_extracts_track_id() {
    let base = link_server().await;
    let resolver = LinkResolver::new(Duration::from_secs(5), 100).unwrap();

    let outcome = resolver.resolve(&format!("{}/found", base)).await.unwrap();
    assert_eq!(
        outcome,
        Resolution::Resolved(ids(&["7ouMYWpwJ422jRcDASZB7P"])[0].clone())
    );
}

#[tokio::test]
async fn test_resolver_non_success_is_not_found() {
    let base = link_server().await;
    let resolver = LinkResolver::new(Duration::from_secs(5), 100).unwrap();

    let outcome = resolver.resolve(&format!("{}/not-found", base)).await.unwrap();
    assert!(matches!(outcome, Resolution::NotFound(_)));
}

#[tokio::test]
async fn test_resolver_unmatched_body_is_not_found() {
    let base = link_server().await;
    let resolver = LinkResolver::new(Duration::from_secs(5), 100).unwrap();

    let outcome = resolver.resolve(&format!("{}/no-match", base)).await.unwrap();
    assert!(matches!(outcome, Resolution::NotFound(_)));
}

#[tokio::test]
async fn test_resolver_times_out() {
    let base = link_server().await;
    let resolver = LinkResolver::new(Duration::from_millis(300), 100).unwrap();

    let err = resolver.resolve(&format!("{}/slow", base)).await.unwrap_err();
    assert!(matches!(err, ResolveError::Timeout(_)));
}

#[tokio::test]
async fn test_resolver_connection_refused_is_error() {
    // Bind then drop to get a port with nothing listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let resolver = LinkResolver::new(Duration::from_secs(2), 100).unwrap();
    let err = resolver.resolve(&format!("http://{}/x", addr)).await.unwrap_err();
    assert!(matches!(err, ResolveError::NetworkError(_)));
}

// ============================================================================
// Track identification API
// ============================================================================

async fn track_id_server() -> String {
    let router = Router::new()
        .route(
            "/api/today",
            get(|| async {
                Json(json!({
                    "message": "ok",
                    "tracks": [
                        {"artist": "Moodymann", "title": "Shades of Jae", "song_link": "https://lis.tn/1"},
                        {"artist": "ID", "title": "ID", "song_link": ""}
                    ]
                }))
            }),
        )
        .route(
            "/api/archive/:date",
            get(|Path(date): Path<String>| async move {
                if date == "broken" {
                    return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
                }
                Json(json!({
                    "message": "ok",
                    "tracks": [{"artist": "Archive", "title": date, "song_link": "https://lis.tn/2"}]
                }))
                .into_response()
            }),
        )
        .route("/api/garbled/today", get(|| async { "not json" }));
    spawn_server(router).await
}

#[tokio::test]
async fn test_fetch_today() {
    let base = track_id_server().await;
    let client = TrackIdClient::new(format!("{}/api", base)).unwrap();

    let candidates = client.fetch_candidates(None).await.unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0], Candidate::new("Moodymann", "Shades of Jae", "https://lis.tn/1"));
    assert_eq!(candidates[1].lookup_link(), None);
}

#[tokio::test]
async fn test_fetch_archive_date() {
    let base = track_id_server().await;
    let client = TrackIdClient::new(format!("{}/api/", base)).unwrap();

    let candidates = client.fetch_candidates(Some("2026-10-01")).await.unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].title, "2026-10-01");
}

#[tokio::test]
async fn test_fetch_error_status() {
    let base = track_id_server().await;
    let client = TrackIdClient::new(format!("{}/api", base)).unwrap();

    let err = client.fetch_candidates(Some("broken")).await.unwrap_err();
    assert!(matches!(err, SourceError::ApiError(500, _)));
}

#[tokio::test]
async fn test_fetch_unparseable_body() {
    let base = track_id_server().await;
    let client = TrackIdClient::new(format!("{}/api/garbled", base)).unwrap();

    let err = client.fetch_candidates(None).await.unwrap_err();
    assert!(matches!(err, SourceError::ParseError(_)));
}

// ============================================================================
// Playlist API
// ============================================================================

#[derive(Clone, Default)]
struct Captured {
    requests: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
}

async fn playlist_server(captured: Captured) -> String {
    let router = Router::new()
        .route(
            "/v1/playlists/:playlist_id/tracks",
            post(
                |State(captured): State<Captured>,
                 Path(playlist_id): Path<String>,
                 headers: HeaderMap,
                 Json(body): Json<Value>| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    if auth.as_deref() != Some("Bearer good-token") {
                        return (StatusCode::UNAUTHORIZED, "expired").into_response();
                    }
                    captured
                        .requests
                        .lock()
                        .unwrap()
                        .push((playlist_id, auth, body));
                    (StatusCode::CREATED, Json(json!({"snapshot_id": "snap-1"}))).into_response()
                },
            ),
        )
        .with_state(captured);
    spawn_server(router).await
}

#[tokio::test]
async fn test_add_tracks_posts_uris() {
    let captured = Captured::default();
    let base = playlist_server(captured.clone()).await;
    let client =
        SpotifyPlaylistClient::new(format!("{}/v1", base), "good-token", "playlist123").unwrap();

    client.add_tracks(&ids(&["A1", "B2"])).await.unwrap();

    let requests = captured.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "playlist123");
    assert_eq!(
        requests[0].2,
        json!({"uris": ["spotify:track:A1", "spotify:track:B2"]})
    );
}

#[tokio::test]
async fn test_add_tracks_unauthorized() {
    let base = playlist_server(Captured::default()).await;
    let client =
        SpotifyPlaylistClient::new(format!("{}/v1", base), "stale-token", "playlist123").unwrap();

    let err = client.add_tracks(&ids(&["A1"])).await.unwrap_err();
    assert!(matches!(err, PlaylistError::Unauthorized));
}

#[tokio::test]
async fn test_add_tracks_limits() {
    let captured = Captured::default();
    let base = playlist_server(captured.clone()).await;
    let client =
        SpotifyPlaylistClient::new(format!("{}/v1", base), "good-token", "playlist123").unwrap();

    // Empty page: no request
    client.add_tracks(&[]).await.unwrap();

    // Oversized page: rejected before any request
    let many: Vec<String> = (0..101).map(|i| format!("T{}", i)).collect();
    let many_refs: Vec<&str> = many.iter().map(String::as_str).collect();
    let err = client.add_tracks(&ids(&many_refs)).await.unwrap_err();
    assert!(matches!(err, PlaylistError::TooManyTracks(101)));

    assert!(captured.requests.lock().unwrap().is_empty());
}

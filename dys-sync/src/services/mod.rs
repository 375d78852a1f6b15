//! Pipeline services and external API clients

pub mod candidate_client;
pub mod deduplicator;
pub mod link_resolver;
pub mod paginator;
pub mod playlist_client;
pub mod resolution_pool;
pub mod sync_orchestrator;

pub use candidate_client::{CandidateSource, SourceError, TrackIdClient};
pub use deduplicator::{filter_new, unique_in_order};
pub use link_resolver::{LinkResolver, ResolveError, Resolution, TrackResolver};
pub use paginator::{paginate, MAX_TRACKS_PER_REQUEST};
pub use playlist_client::{PlaylistError, PlaylistSink, SpotifyPlaylistClient};
pub use resolution_pool::ResolutionPool;
pub use sync_orchestrator::SyncOrchestrator;

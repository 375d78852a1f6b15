//! Data models for the sync pipeline

pub mod candidate;
pub mod sync_run;
pub mod track_id;

pub use candidate::{Candidate, CandidateResponse};
pub use sync_run::{PhaseTransition, SyncPhase, SyncReport, SyncRun};
pub use track_id::TrackId;

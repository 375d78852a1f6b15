//! Sync run state machine
//!
//! A run moves strictly forward:
//! FETCH_CANDIDATES → RESOLVE → DEDUPLICATE → PAGINATE → SUBMIT_PAGE* → PERSIST_NEW_IDS → DONE
//!
//! Empty candidate lists and empty new-id sets jump straight to DONE.
//! Any unrecovered error ends the run in FAILED.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sync run phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncPhase {
    /// Fetch candidates from the track identification API
    FetchCandidates,
    /// Resolve candidate links to track ids
    Resolve,
    /// Drop ids already recorded in the track store
    Deduplicate,
    /// Slice new ids into submission pages
    Paginate,
    /// Submit one page to the playlist
    SubmitPage,
    /// Record submitted ids in the track store
    PersistNewIds,
    /// Run finished successfully
    Done,
    /// Run aborted with an error
    Failed,
}

/// State transition record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub run_id: Uuid,
    pub old_phase: SyncPhase,
    pub new_phase: SyncPhase,
    pub transitioned_at: DateTime<Utc>,
}

/// In-memory state of one sync run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRun {
    pub run_id: Uuid,
    pub phase: SyncPhase,
    /// Archive date requested instead of "today"
    pub date_override: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl SyncRun {
    pub fn new(date_override: Option<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            phase: SyncPhase::FetchCandidates,
            date_override,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Transition to a new phase
    pub fn transition_to(&mut self, new_phase: SyncPhase) -> PhaseTransition {
        let transition = PhaseTransition {
            run_id: self.run_id,
            old_phase: self.phase,
            new_phase,
            transitioned_at: Utc::now(),
        };

        tracing::debug!(
            run_id = %self.run_id,
            from = ?self.phase,
            to = ?new_phase,
            "Sync phase transition"
        );

        self.phase = new_phase;
        if self.is_terminal() {
            self.ended_at = Some(transition.transitioned_at);
        }

        transition
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, SyncPhase::Done | SyncPhase::Failed)
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Candidates returned by the identification API
    pub candidates: usize,
    /// Candidates that resolved to a track id
    pub resolved: usize,
    /// Resolved ids after collapsing repeats within the run
    pub unique: usize,
    /// Ids not yet recorded in the track store
    pub new: usize,
    pub pages_submitted: usize,
    pub tracks_submitted: usize,
}

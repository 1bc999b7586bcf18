use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Phase, RunMode, SessionMode};

/// Every state change in a focus session produces an Event.
/// The CLI prints them as JSON; hosting UIs subscribe to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        subject_id: String,
        topic_id: String,
        mode: SessionMode,
        at: DateTime<Utc>,
    },
    /// Interval mode only: the study/break countdown expired and the
    /// phase flipped. `phase_secs` is the full duration of the new phase.
    PhaseChanged {
        phase: Phase,
        phase_secs: u64,
        at: DateTime<Utc>,
    },
    /// Free mode pause: the user is being asked whether to time the break.
    /// Neither counter advances until they decide.
    BreakPromptShown {
        at: DateTime<Utc>,
    },
    /// The user chose to time the break actively.
    BreakStarted {
        at: DateTime<Utc>,
    },
    Paused {
        at: DateTime<Utc>,
    },
    Resumed {
        at: DateTime<Utc>,
    },
    /// The session moved to the summary step; values are still editable.
    SessionEnded {
        duration_secs: u64,
        pause_secs: u64,
        at: DateTime<Utc>,
    },
    /// The edited session record was committed to storage.
    SessionFinalized {
        session_id: i64,
        duration_secs: u64,
        pause_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: SessionMode,
        run_mode: RunMode,
        phase: Phase,
        phase_remaining_secs: u64,
        elapsed_study_secs: u64,
        elapsed_pause_secs: u64,
        display_secs: u64,
        at: DateTime<Utc>,
    },
}

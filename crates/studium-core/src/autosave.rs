//! Periodic and close-time persistence of in-progress sessions.
//!
//! Two triggers, one writer:
//! - a heartbeat on a fixed cadence while the timer is running,
//! - an unconditional snapshot when the hosting process is torn down.
//!
//! Both produce a [`SessionDraft`] upserted into the same storage row. The
//! row id is established by the first insert and remembered, so a
//! heartbeat and a close-time save racing each other only rewrite the same
//! monotonically-progressing snapshot; last write wins and nothing is
//! lost. Write failures are logged and dropped -- the next heartbeat
//! carries fresher values anyway.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::model::SessionDraft;
use crate::storage::Database;
use crate::timer::{RunMode, SessionTimer};

/// Default heartbeat cadence.
pub const DEFAULT_HEARTBEAT_SECS: u64 = 30;

/// Markers distinguishing checkpoint writes from the final record.
const HEARTBEAT_MARKER: &str = " (periodic autosave)";
const SHUTDOWN_MARKER: &str = " (autosaved on close)";

/// Drives the autosave cadence and remembers the storage row for a run.
///
/// Serializable alongside [`SessionTimer`] so the row id survives host
/// restarts within one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveCoordinator {
    interval_ms: u64,
    last_fire_ms: u64,
    session_row: Option<i64>,
}

impl AutosaveCoordinator {
    pub fn new(interval_secs: u64, now_ms: u64) -> Self {
        Self {
            interval_ms: interval_secs.saturating_mul(1000),
            last_fire_ms: now_ms,
            session_row: None,
        }
    }

    /// The storage row claimed by the first successful save, if any.
    /// The finalizer upserts over the same id.
    pub fn saved_row(&self) -> Option<i64> {
        self.session_row
    }

    /// Heartbeat check. Returns a checkpoint draft when the cadence is due
    /// and the timer is actually accruing study time.
    ///
    /// The cadence anchor advances whether or not the gate passes, like a
    /// fixed-interval trigger that sometimes finds nothing to do: pausing
    /// for three minutes does not cause a burst of saves on resume.
    pub fn poll(&mut self, now_ms: u64, timer: &SessionTimer) -> Option<SessionDraft> {
        if now_ms.saturating_sub(self.last_fire_ms) < self.interval_ms {
            return None;
        }
        self.last_fire_ms = now_ms;
        if timer.run_mode() != RunMode::Running || timer.elapsed_study_secs() == 0 {
            return None;
        }
        let mut draft = timer.draft(Utc::now());
        draft.notes.push_str(HEARTBEAT_MARKER);
        Some(draft)
    }

    /// Emergency snapshot for teardown paths. Unconditional: even a paused
    /// session is worth a checkpoint when the process is going away.
    pub fn shutdown_draft(&self, timer: &SessionTimer) -> SessionDraft {
        let mut draft = timer.draft(Utc::now());
        draft.notes.push_str(SHUTDOWN_MARKER);
        draft
    }

    /// Write a draft to storage, updating the remembered row in place or
    /// inserting and claiming a new one.
    ///
    /// Fire-and-forget: failures are logged at `warn` and swallowed. The
    /// timer keeps advancing regardless, and the next heartbeat retries
    /// implicitly with fresher values.
    pub fn commit(&mut self, db: &Database, draft: &SessionDraft) {
        match self.session_row {
            Some(id) => {
                if let Err(e) = db.update_session(id, draft) {
                    log::warn!("autosave update for session row {id} failed: {e}");
                }
            }
            None => match db.insert_session(draft) {
                Ok(id) => self.session_row = Some(id),
                Err(e) => log::warn!("autosave insert failed: {e}"),
            },
        }
    }
}

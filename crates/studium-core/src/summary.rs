//! Session finalization with a review/edit step.
//!
//! Ending a session freezes the live counters into minute/second fields
//! the user can correct before anything is committed. The edited values --
//! not whatever the timer reached -- become the persisted record. The step
//! is escapable: resuming discards the summary and returns to the running
//! timer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::SessionDraft;
use crate::timer::{SessionMode, SessionTimer};

/// The editable summary parked between "end session" and "finalize".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    subject_id: String,
    topic_id: String,
    mode: SessionMode,
    study_min: u64,
    study_sec: u64,
    pause_min: u64,
    pause_sec: u64,
    notes: String,
}

impl SessionSummary {
    /// Freeze the timer's counters into editable fields.
    pub fn from_timer(timer: &SessionTimer) -> Self {
        let study = timer.elapsed_study_secs();
        let pause = timer.elapsed_pause_secs();
        Self {
            subject_id: timer.subject_id().to_string(),
            topic_id: timer.topic_id().to_string(),
            mode: timer.mode(),
            study_min: study / 60,
            study_sec: study % 60,
            pause_min: pause / 60,
            pause_sec: pause % 60,
            notes: timer.notes().to_string(),
        }
    }

    // ── Edits ────────────────────────────────────────────────────────
    //
    // Invalid input is clamped, never rejected: minutes floor at zero,
    // seconds live in 0..=59.

    pub fn set_study_minutes(&mut self, minutes: i64) {
        self.study_min = clamp_minutes(minutes);
    }

    pub fn set_study_seconds(&mut self, seconds: i64) {
        self.study_sec = clamp_seconds(seconds);
    }

    pub fn set_pause_minutes(&mut self, minutes: i64) {
        self.pause_min = clamp_minutes(minutes);
    }

    pub fn set_pause_seconds(&mut self, seconds: i64) {
        self.pause_sec = clamp_seconds(seconds);
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn topic_id(&self) -> &str {
        &self.topic_id
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn study_secs(&self) -> u64 {
        self.study_min * 60 + self.study_sec
    }

    pub fn pause_secs(&self) -> u64 {
        self.pause_min * 60 + self.pause_sec
    }

    /// Materialize the final record from the edited values, dated at the
    /// moment of confirmation.
    pub fn finalize(&self, date: DateTime<Utc>) -> SessionDraft {
        SessionDraft {
            subject_id: self.subject_id.clone(),
            topic_id: self.topic_id.clone(),
            date,
            duration_secs: self.study_secs(),
            pause_secs: self.pause_secs(),
            notes: self.notes.clone(),
            mode: self.mode,
        }
    }
}

fn clamp_minutes(v: i64) -> u64 {
    v.max(0) as u64
}

fn clamp_seconds(v: i64) -> u64 {
    v.clamp(0, 59) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::IntervalConfig;

    fn summary_after(study_ms: u64) -> SessionSummary {
        let (mut timer, _) = SessionTimer::start(
            "subject-1",
            "topic-1",
            SessionMode::Free,
            IntervalConfig::default(),
            Utc::now(),
            0,
        );
        timer.tick(study_ms);
        SessionSummary::from_timer(&timer)
    }

    #[test]
    fn counters_split_into_minutes_and_seconds() {
        let summary = summary_after(125_000);
        assert_eq!(summary.study_secs(), 125);
        let draft = summary.finalize(Utc::now());
        assert_eq!(draft.duration_secs, 125);
        assert_eq!(draft.pause_secs, 0);
    }

    #[test]
    fn edits_override_the_live_counters() {
        let mut summary = summary_after(125_000);
        // Timer said 2:05; the user corrects to 2:10.
        summary.set_study_minutes(2);
        summary.set_study_seconds(10);
        summary.set_pause_seconds(10);
        summary.set_notes("finished the exercises");

        let draft = summary.finalize(Utc::now());
        assert_eq!(draft.duration_secs, 130);
        assert_eq!(draft.pause_secs, 10);
        assert_eq!(draft.notes, "finished the exercises");
    }

    #[test]
    fn finalize_is_idempotent_over_edited_values() {
        let mut summary = summary_after(999_000);
        summary.set_study_minutes(3);
        summary.set_study_seconds(30);
        let first = summary.finalize(Utc::now());
        let second = summary.finalize(Utc::now());
        assert_eq!(first.duration_secs, 210);
        assert_eq!(second.duration_secs, 210);
    }

    #[test]
    fn invalid_edits_are_clamped_not_rejected() {
        let mut summary = summary_after(10_000);
        summary.set_study_minutes(-5);
        summary.set_study_seconds(75);
        summary.set_pause_minutes(-1);
        summary.set_pause_seconds(-20);
        assert_eq!(summary.study_secs(), 59);
        assert_eq!(summary.pause_secs(), 0);
    }
}

//! Focus-session state machine.
//!
//! `SessionTimer` is wall-clock driven. It has no internal thread: the
//! hosting layer delivers every external trigger (scheduled tick,
//! visibility change, user input) as one method call, and each call is a
//! complete transition on the single owned state.
//!
//! ## Run modes
//!
//! ```text
//! Running --pause (free)----> PausedWaitingDecision --begin_timed_break--> BreakActive
//! Running --pause (interval)> PausedManual           --pause (untimed)---> PausedManual
//! PausedManual | BreakActive --resume--> Running
//! ```
//!
//! Clock routing per consumed delta:
//! - `Running` feeds the study counter (and the phase countdown in
//!   interval mode).
//! - `BreakActive`, and `PausedManual` in free mode, feed the pause
//!   counter.
//! - `PausedManual` in interval mode and `PausedWaitingDecision` drop the
//!   delta entirely: time spent deciding is charged to neither bucket, and
//!   interval-mode manual pauses are untimed by design.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::clock::WallClock;
use crate::error::ValidationError;
use crate::events::Event;
use crate::model::SessionDraft;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Uncapped, manually paced; no phase structure.
    Free,
    /// Alternating fixed-length study and break phases.
    Interval,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Free => "free",
            SessionMode::Interval => "interval",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(SessionMode::Free),
            "interval" => Some(SessionMode::Interval),
            _ => None,
        }
    }
}

/// Study/break phase durations for interval mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalConfig {
    pub study_minutes: u64,
    pub break_minutes: u64,
}

impl IntervalConfig {
    /// Both durations must be positive.
    pub fn new(study_minutes: u64, break_minutes: u64) -> Result<Self, ValidationError> {
        if study_minutes == 0 {
            return Err(ValidationError::InvalidValue {
                field: "study_minutes".into(),
                message: "must be greater than zero".into(),
            });
        }
        if break_minutes == 0 {
            return Err(ValidationError::InvalidValue {
                field: "break_minutes".into(),
                message: "must be greater than zero".into(),
            });
        }
        Ok(Self {
            study_minutes,
            break_minutes,
        })
    }

    pub fn study_secs(&self) -> u64 {
        self.study_minutes.saturating_mul(60)
    }

    pub fn break_secs(&self) -> u64 {
        self.break_minutes.saturating_mul(60)
    }

    fn phase_secs(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Study => self.study_secs(),
            Phase::Break => self.break_secs(),
        }
    }
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            study_minutes: 25,
            break_minutes: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Study,
    Break,
}

impl Phase {
    fn toggled(self) -> Self {
        match self {
            Phase::Study => Phase::Break,
            Phase::Break => Phase::Study,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Running,
    /// Free mode, first pause press: the user is choosing between a timed
    /// break and a plain pause. Neither counter advances here.
    PausedWaitingDecision,
    PausedManual,
    BreakActive,
}

/// State of one focus-session run.
///
/// Serializable so a host can park it between invocations; the embedded
/// clock reference survives the round trip, which is what makes the
/// stateless-CLI usage work across long gaps.
///
/// In interval mode the study counter keeps accumulating through phase
/// flips, break phases included -- it measures total engagement against
/// the wall clock, not study-phase time. That mirrors the behavior this
/// tracker was built against and is kept deliberately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTimer {
    subject_id: String,
    topic_id: String,
    mode: SessionMode,
    interval: IntervalConfig,
    phase: Phase,
    phase_remaining_secs: u64,
    run_mode: RunMode,
    elapsed_study_secs: u64,
    elapsed_pause_secs: u64,
    notes: String,
    started_at: DateTime<Utc>,
    clock: WallClock,
}

impl SessionTimer {
    /// Begin a session in the `Running` state.
    ///
    /// `now_ms` anchors the clock; `interval` is irrelevant in free mode
    /// but kept so the run can be reconfigured-free and serialized whole.
    pub fn start(
        subject_id: impl Into<String>,
        topic_id: impl Into<String>,
        mode: SessionMode,
        interval: IntervalConfig,
        started_at: DateTime<Utc>,
        now_ms: u64,
    ) -> (Self, Event) {
        let timer = Self {
            subject_id: subject_id.into(),
            topic_id: topic_id.into(),
            mode,
            interval,
            phase: Phase::Study,
            phase_remaining_secs: interval.study_secs(),
            run_mode: RunMode::Running,
            elapsed_study_secs: 0,
            elapsed_pause_secs: 0,
            notes: String::new(),
            started_at,
            clock: WallClock::new(now_ms),
        };
        let event = Event::SessionStarted {
            subject_id: timer.subject_id.clone(),
            topic_id: timer.topic_id.clone(),
            mode,
            at: started_at,
        };
        (timer, event)
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

    pub fn interval(&self) -> IntervalConfig {
        self.interval
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn phase_remaining_secs(&self) -> u64 {
        self.phase_remaining_secs
    }

    pub fn run_mode(&self) -> RunMode {
        self.run_mode
    }

    pub fn elapsed_study_secs(&self) -> u64 {
        self.elapsed_study_secs
    }

    pub fn elapsed_pause_secs(&self) -> u64 {
        self.elapsed_pause_secs
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// The number a clock face would show: the phase countdown in interval
    /// mode, total elapsed study time in free mode.
    pub fn display_secs(&self) -> u64 {
        match self.mode {
            SessionMode::Interval => self.phase_remaining_secs,
            SessionMode::Free => self.elapsed_study_secs,
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            mode: self.mode,
            run_mode: self.run_mode,
            phase: self.phase,
            phase_remaining_secs: self.phase_remaining_secs,
            elapsed_study_secs: self.elapsed_study_secs,
            elapsed_pause_secs: self.elapsed_pause_secs,
            display_secs: self.display_secs(),
            at: Utc::now(),
        }
    }

    /// Map the current counters into a persistable session payload.
    pub fn draft(&self, date: DateTime<Utc>) -> SessionDraft {
        SessionDraft {
            subject_id: self.subject_id.clone(),
            topic_id: self.topic_id.clone(),
            date,
            duration_secs: self.elapsed_study_secs,
            pause_secs: self.elapsed_pause_secs,
            notes: self.notes.clone(),
            mode: self.mode,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Deliver a wall-clock sample. Call on every external trigger.
    ///
    /// Consumes at most one delta and routes it to exactly one counter
    /// (or drops it, per the module docs). Returns `Some(PhaseChanged)`
    /// when an interval phase flips.
    pub fn tick(&mut self, now_ms: u64) -> Option<Event> {
        let delta = self.clock.consume(now_ms);
        if delta == 0 {
            return None;
        }
        match self.run_mode {
            RunMode::Running => {
                self.elapsed_study_secs += delta;
                if self.mode == SessionMode::Interval {
                    return self.advance_phase(delta);
                }
                None
            }
            RunMode::BreakActive => {
                self.elapsed_pause_secs += delta;
                None
            }
            RunMode::PausedManual if self.mode == SessionMode::Free => {
                self.elapsed_pause_secs += delta;
                None
            }
            // Untimed: interval-mode manual pause and the break-decision
            // prompt consume the delta without charging it anywhere.
            RunMode::PausedManual | RunMode::PausedWaitingDecision => None,
        }
    }

    fn advance_phase(&mut self, delta: u64) -> Option<Event> {
        if delta < self.phase_remaining_secs {
            self.phase_remaining_secs -= delta;
            return None;
        }
        // Countdown expired. The overshoot is discarded rather than
        // carried into the next phase, and a delta spanning several
        // phases still flips only once. Known simplification, kept.
        self.phase = self.phase.toggled();
        self.phase_remaining_secs = self.interval.phase_secs(self.phase);
        Some(Event::PhaseChanged {
            phase: self.phase,
            phase_secs: self.phase_remaining_secs,
            at: Utc::now(),
        })
    }

    /// Pause button.
    ///
    /// In free mode the first press opens the timed-break decision; a
    /// press while the decision is open is the "just pause" choice. In
    /// interval mode pausing is immediate and untimed.
    pub fn pause(&mut self) -> Option<Event> {
        match (self.run_mode, self.mode) {
            (RunMode::Running, SessionMode::Free) => {
                self.run_mode = RunMode::PausedWaitingDecision;
                Some(Event::BreakPromptShown { at: Utc::now() })
            }
            (RunMode::Running, SessionMode::Interval) => {
                self.run_mode = RunMode::PausedManual;
                Some(Event::Paused { at: Utc::now() })
            }
            (RunMode::PausedWaitingDecision, _) => {
                self.run_mode = RunMode::PausedManual;
                Some(Event::Paused { at: Utc::now() })
            }
            _ => None,
        }
    }

    /// The "time my break" choice from the decision prompt.
    pub fn begin_timed_break(&mut self) -> Option<Event> {
        if self.run_mode != RunMode::PausedWaitingDecision {
            return None;
        }
        self.run_mode = RunMode::BreakActive;
        Some(Event::BreakStarted { at: Utc::now() })
    }

    pub fn resume(&mut self) -> Option<Event> {
        match self.run_mode {
            RunMode::PausedManual | RunMode::BreakActive => {
                self.run_mode = RunMode::Running;
                Some(Event::Resumed { at: Utc::now() })
            }
            _ => None,
        }
    }

    /// Re-anchor the clock without counting the gap since the last sample.
    /// Used when a run comes back from the summary step: time spent
    /// reviewing is charged to neither counter.
    pub fn resync(&mut self, now_ms: u64) {
        self.clock.resync(now_ms);
    }

    /// Return from the summary step to a running timer, discarding the
    /// review gap. Guards against accidental "end session" presses.
    pub fn reopen(&mut self, now_ms: u64) -> Event {
        self.clock.resync(now_ms);
        self.run_mode = RunMode::Running;
        Event::Resumed { at: Utc::now() }
    }

    /// Replace the free-text notes. Included in every autosave and in the
    /// finalize payload.
    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }
}

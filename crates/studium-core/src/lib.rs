//! # Studium Core Library
//!
//! Core business logic for Studium, a study-time tracker: subjects and
//! topics, timed focus sessions (free-form or alternating study/break
//! intervals), periodic autosave of in-progress sessions, and an editable
//! summary step before a session is persisted for good.
//!
//! ## Architecture
//!
//! - **Session timer**: a wall-clock-driven state machine with no internal
//!   thread; the hosting layer delivers every external trigger as one
//!   method call and owns the single state instance
//! - **Autosave**: a heartbeat/teardown coordinator that turns timer state
//!   into storage upserts keyed by one row id per run
//! - **Storage**: SQLite for the catalog and session history, TOML for
//!   configuration
//!
//! ## Key Components
//!
//! - [`SessionTimer`]: the focus-session state machine
//! - [`AutosaveCoordinator`]: periodic and close-time checkpoints
//! - [`SessionSummary`]: the review/edit step that finalizes a session
//! - [`Database`]: catalog, session and key-value persistence
//! - [`Config`]: application configuration

pub mod autosave;
pub mod error;
pub mod events;
pub mod model;
pub mod storage;
pub mod summary;
pub mod timer;

pub use autosave::AutosaveCoordinator;
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use model::{IntervalPreset, SessionDraft, SessionRecord, Subject, Topic};
pub use storage::{data_dir, Config, Database, Stats};
pub use summary::SessionSummary;
pub use timer::{now_ms, IntervalConfig, Phase, RunMode, SessionMode, SessionTimer, WallClock};

//! Persisted data model: subjects, topics, interval presets and the
//! session records produced by the timer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timer::SessionMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub color: String,
    pub archived: bool,
}

impl Subject {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            color: color.into(),
            archived: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub subject_id: String,
    pub name: String,
    pub completed: bool,
}

impl Topic {
    pub fn new(subject_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            subject_id: subject_id.into(),
            name: name.into(),
            completed: false,
        }
    }
}

/// A saved study/break duration pair selectable at session start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalPreset {
    pub id: String,
    pub name: String,
    pub study_minutes: u64,
    pub break_minutes: u64,
}

impl IntervalPreset {
    pub fn new(name: impl Into<String>, study_minutes: u64, break_minutes: u64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            study_minutes,
            break_minutes,
        }
    }
}

/// A session payload not yet bound to a storage row. Autosave checkpoints,
/// close-time snapshots and the finalized record all take this shape; the
/// row id is established by the first insert and reused thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDraft {
    pub subject_id: String,
    pub topic_id: String,
    pub date: DateTime<Utc>,
    pub duration_secs: u64,
    pub pause_secs: u64,
    pub notes: String,
    pub mode: SessionMode,
}

/// A session row read back from storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub subject_id: String,
    pub topic_id: String,
    pub date: DateTime<Utc>,
    pub duration_secs: u64,
    pub pause_secs: u64,
    pub notes: String,
    pub mode: SessionMode,
}

//! SQLite-based storage.
//!
//! Persists:
//! - the subject/topic catalog
//! - session records (autosave checkpoints and finalized sessions share
//!   one table; a checkpoint row is simply overwritten in place)
//! - a key-value store the CLI uses to park in-flight timer state

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::DatabaseError;
use crate::model::{SessionDraft, SessionRecord, Subject, Topic};
use crate::timer::SessionMode;

use super::data_dir;

/// Aggregate session statistics.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Stats {
    pub total_sessions: u64,
    pub total_study_secs: u64,
    pub total_pause_secs: u64,
    pub free_sessions: u64,
    pub interval_sessions: u64,
}

/// SQLite database handle.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/studium/studium.db`.
    ///
    /// Creates the file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let path = data_dir().map_err(DatabaseError::DataDir)?.join("studium.db");
        Self::open_at(&path)
    }

    /// Open a database at an explicit path (tests, custom hosts).
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS subjects (
                id       TEXT PRIMARY KEY,
                name     TEXT NOT NULL,
                color    TEXT NOT NULL DEFAULT '',
                archived INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS topics (
                id         TEXT PRIMARY KEY,
                subject_id TEXT NOT NULL,
                name       TEXT NOT NULL,
                completed  INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS sessions (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                subject_id    TEXT NOT NULL,
                topic_id      TEXT NOT NULL,
                date          TEXT NOT NULL,
                duration_secs INTEGER NOT NULL,
                pause_secs    INTEGER NOT NULL,
                notes         TEXT NOT NULL DEFAULT '',
                mode          TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_topics_subject ON topics(subject_id);
            CREATE INDEX IF NOT EXISTS idx_sessions_date ON sessions(date);
            CREATE INDEX IF NOT EXISTS idx_sessions_subject ON sessions(subject_id);",
        )?;
        Ok(())
    }

    // ── Sessions ─────────────────────────────────────────────────────

    /// Insert a session payload, returning the generated row id.
    pub fn insert_session(&self, draft: &SessionDraft) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO sessions (subject_id, topic_id, date, duration_secs, pause_secs, notes, mode)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                draft.subject_id,
                draft.topic_id,
                draft.date.to_rfc3339(),
                draft.duration_secs,
                draft.pause_secs,
                draft.notes,
                draft.mode.as_str(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Overwrite an existing session row with a fresh payload.
    pub fn update_session(&self, id: i64, draft: &SessionDraft) -> Result<(), DatabaseError> {
        self.conn.execute(
            "UPDATE sessions
             SET subject_id = ?1, topic_id = ?2, date = ?3, duration_secs = ?4,
                 pause_secs = ?5, notes = ?6, mode = ?7
             WHERE id = ?8",
            params![
                draft.subject_id,
                draft.topic_id,
                draft.date.to_rfc3339(),
                draft.duration_secs,
                draft.pause_secs,
                draft.notes,
                draft.mode.as_str(),
                id,
            ],
        )?;
        Ok(())
    }

    pub fn get_session(&self, id: i64) -> Result<Option<SessionRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, subject_id, topic_id, date, duration_secs, pause_secs, notes, mode
             FROM sessions WHERE id = ?1",
        )?;
        let result = stmt.query_row(params![id], session_from_row);
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List sessions, newest first, optionally restricted to a subject.
    pub fn list_sessions(
        &self,
        subject_id: Option<&str>,
    ) -> Result<Vec<SessionRecord>, DatabaseError> {
        let mut records = Vec::new();
        match subject_id {
            Some(subject) => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, subject_id, topic_id, date, duration_secs, pause_secs, notes, mode
                     FROM sessions WHERE subject_id = ?1 ORDER BY date DESC",
                )?;
                let rows = stmt.query_map(params![subject], session_from_row)?;
                for row in rows {
                    records.push(row?);
                }
            }
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, subject_id, topic_id, date, duration_secs, pause_secs, notes, mode
                     FROM sessions ORDER BY date DESC",
                )?;
                let rows = stmt.query_map([], session_from_row)?;
                for row in rows {
                    records.push(row?);
                }
            }
        }
        Ok(records)
    }

    pub fn delete_session(&self, id: i64) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
        Ok(())
    }

    // ── Subjects & topics ────────────────────────────────────────────

    pub fn insert_subject(&self, subject: &Subject) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO subjects (id, name, color, archived) VALUES (?1, ?2, ?3, ?4)",
            params![subject.id, subject.name, subject.color, subject.archived],
        )?;
        Ok(())
    }

    pub fn get_subject(&self, id: &str) -> Result<Option<Subject>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color, archived FROM subjects WHERE id = ?1")?;
        let result = stmt.query_row(params![id], subject_from_row);
        match result {
            Ok(subject) => Ok(Some(subject)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_subjects(&self, include_archived: bool) -> Result<Vec<Subject>, DatabaseError> {
        let sql = if include_archived {
            "SELECT id, name, color, archived FROM subjects ORDER BY name"
        } else {
            "SELECT id, name, color, archived FROM subjects WHERE archived = 0 ORDER BY name"
        };
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], subject_from_row)?;
        let mut subjects = Vec::new();
        for row in rows {
            subjects.push(row?);
        }
        Ok(subjects)
    }

    pub fn set_subject_archived(&self, id: &str, archived: bool) -> Result<(), DatabaseError> {
        self.conn.execute(
            "UPDATE subjects SET archived = ?1 WHERE id = ?2",
            params![archived, id],
        )?;
        Ok(())
    }

    /// Delete a subject along with its topics and session history.
    pub fn delete_subject(&mut self, id: &str) -> Result<(), DatabaseError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM sessions WHERE subject_id = ?1", params![id])?;
        tx.execute("DELETE FROM topics WHERE subject_id = ?1", params![id])?;
        tx.execute("DELETE FROM subjects WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(())
    }

    pub fn insert_topic(&self, topic: &Topic) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO topics (id, subject_id, name, completed) VALUES (?1, ?2, ?3, ?4)",
            params![topic.id, topic.subject_id, topic.name, topic.completed],
        )?;
        Ok(())
    }

    pub fn list_topics(&self, subject_id: &str) -> Result<Vec<Topic>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, subject_id, name, completed FROM topics
             WHERE subject_id = ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![subject_id], |row| {
            Ok(Topic {
                id: row.get(0)?,
                subject_id: row.get(1)?,
                name: row.get(2)?,
                completed: row.get(3)?,
            })
        })?;
        let mut topics = Vec::new();
        for row in rows {
            topics.push(row?);
        }
        Ok(topics)
    }

    pub fn set_topic_completed(&self, id: &str, completed: bool) -> Result<(), DatabaseError> {
        self.conn.execute(
            "UPDATE topics SET completed = ?1 WHERE id = ?2",
            params![completed, id],
        )?;
        Ok(())
    }

    pub fn delete_topic(&self, id: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM topics WHERE id = ?1", params![id])?;
        Ok(())
    }

    // ── Stats ────────────────────────────────────────────────────────

    pub fn stats_today(&self) -> Result<Stats, DatabaseError> {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        self.stats_where(
            "WHERE date >= ?1",
            params![format!("{today}T00:00:00+00:00")],
        )
    }

    pub fn stats_all(&self) -> Result<Stats, DatabaseError> {
        self.stats_where("", [])
    }

    fn stats_where<P: rusqlite::Params>(
        &self,
        filter: &str,
        params: P,
    ) -> Result<Stats, DatabaseError> {
        let sql = format!(
            "SELECT mode, COUNT(*), COALESCE(SUM(duration_secs), 0), COALESCE(SUM(pause_secs), 0)
             FROM sessions {filter} GROUP BY mode"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params, |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u64>(1)?,
                row.get::<_, u64>(2)?,
                row.get::<_, u64>(3)?,
            ))
        })?;

        let mut stats = Stats::default();
        for row in rows {
            let (mode, count, study, pause) = row?;
            stats.total_sessions += count;
            stats.total_study_secs += study;
            stats.total_pause_secs += pause;
            match mode.as_str() {
                "free" => stats.free_sessions += count,
                "interval" => stats.interval_sessions += count,
                _ => {}
            }
        }
        Ok(stats)
    }

    // ── Key-value store ──────────────────────────────────────────────

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

fn session_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SessionRecord> {
    let date_str: String = row.get(3)?;
    let date = DateTime::parse_from_rfc3339(&date_str)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;
    let mode_str: String = row.get(7)?;
    let mode = SessionMode::parse(&mode_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            7,
            rusqlite::types::Type::Text,
            format!("unknown session mode '{mode_str}'").into(),
        )
    })?;
    Ok(SessionRecord {
        id: row.get(0)?,
        subject_id: row.get(1)?,
        topic_id: row.get(2)?,
        date,
        duration_secs: row.get(4)?,
        pause_secs: row.get(5)?,
        notes: row.get(6)?,
        mode,
    })
}

fn subject_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Subject> {
    Ok(Subject {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        archived: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(subject: &str, duration: u64, mode: SessionMode) -> SessionDraft {
        SessionDraft {
            subject_id: subject.into(),
            topic_id: "topic-1".into(),
            date: Utc::now(),
            duration_secs: duration,
            pause_secs: 10,
            notes: "notes".into(),
            mode,
        }
    }

    #[test]
    fn session_insert_update_round_trip() {
        let db = Database::open_memory().unwrap();
        let id = db
            .insert_session(&draft("subject-1", 120, SessionMode::Free))
            .unwrap();

        let mut updated = draft("subject-1", 300, SessionMode::Free);
        updated.notes = "more notes".into();
        db.update_session(id, &updated).unwrap();

        let stored = db.get_session(id).unwrap().unwrap();
        assert_eq!(stored.duration_secs, 300);
        assert_eq!(stored.pause_secs, 10);
        assert_eq!(stored.notes, "more notes");
        assert_eq!(stored.mode, SessionMode::Free);
    }

    #[test]
    fn missing_session_is_none() {
        let db = Database::open_memory().unwrap();
        assert!(db.get_session(99).unwrap().is_none());
    }

    #[test]
    fn subject_and_topic_crud() {
        let mut db = Database::open_memory().unwrap();
        let subject = Subject::new("Mathematics", "#6366f1");
        db.insert_subject(&subject).unwrap();

        let topic = Topic::new(&subject.id, "Integrals");
        db.insert_topic(&topic).unwrap();
        db.set_topic_completed(&topic.id, true).unwrap();
        assert!(db.list_topics(&subject.id).unwrap()[0].completed);

        db.set_subject_archived(&subject.id, true).unwrap();
        assert!(db.list_subjects(false).unwrap().is_empty());
        assert_eq!(db.list_subjects(true).unwrap().len(), 1);

        db.insert_session(&draft(&subject.id, 60, SessionMode::Free))
            .unwrap();
        db.delete_subject(&subject.id).unwrap();
        assert!(db.get_subject(&subject.id).unwrap().is_none());
        assert!(db.list_topics(&subject.id).unwrap().is_empty());
        assert!(db.list_sessions(None).unwrap().is_empty());
    }

    #[test]
    fn stats_split_by_mode() {
        let db = Database::open_memory().unwrap();
        db.insert_session(&draft("s1", 100, SessionMode::Free))
            .unwrap();
        db.insert_session(&draft("s1", 200, SessionMode::Interval))
            .unwrap();

        let stats = db.stats_all().unwrap();
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.total_study_secs, 300);
        assert_eq!(stats.total_pause_secs, 20);
        assert_eq!(stats.free_sessions, 1);
        assert_eq!(stats.interval_sessions, 1);

        // Both sessions are dated now, so today's view matches.
        let today = db.stats_today().unwrap();
        assert_eq!(today.total_sessions, 2);
    }

    #[test]
    fn list_sessions_filters_by_subject() {
        let db = Database::open_memory().unwrap();
        db.insert_session(&draft("s1", 100, SessionMode::Free))
            .unwrap();
        db.insert_session(&draft("s2", 200, SessionMode::Free))
            .unwrap();
        assert_eq!(db.list_sessions(Some("s1")).unwrap().len(), 1);
        assert_eq!(db.list_sessions(None).unwrap().len(), 2);
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("active").unwrap().is_none());
        db.kv_set("active", "{}").unwrap();
        assert_eq!(db.kv_get("active").unwrap().unwrap(), "{}");
        db.kv_delete("active").unwrap();
        assert!(db.kv_get("active").unwrap().is_none());
    }

    #[test]
    fn opens_on_disk_at_an_explicit_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("studium.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.insert_session(&draft("s1", 42, SessionMode::Free))
                .unwrap();
        }
        let reopened = Database::open_at(&path).unwrap();
        assert_eq!(reopened.list_sessions(None).unwrap().len(), 1);
    }
}

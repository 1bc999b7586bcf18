use std::io::Write;
use std::time::Duration;

use chrono::Utc;
use clap::Subcommand;
use studium_core::storage::{Config, Database};
use studium_core::timer::{now_ms, IntervalConfig, Phase, RunMode, SessionMode, SessionTimer};
use studium_core::{AutosaveCoordinator, Event, SessionSummary};

/// kv keys parking the in-flight session between invocations.
const TIMER_KEY: &str = "active_timer";
const AUTOSAVE_KEY: &str = "autosave_state";
const SUMMARY_KEY: &str = "pending_summary";

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start a focus session
    Start {
        /// Subject id
        #[arg(long)]
        subject: String,
        /// Topic id
        #[arg(long)]
        topic: String,
        /// Run an interval (study/break) session instead of a free one
        #[arg(long)]
        interval: bool,
        /// Study phase length in minutes (interval mode)
        #[arg(long = "study")]
        study_minutes: Option<u64>,
        /// Break phase length in minutes (interval mode)
        #[arg(long = "break")]
        break_minutes: Option<u64>,
        /// Use a saved preset's durations (interval mode)
        #[arg(long)]
        preset: Option<String>,
    },
    /// Deliver a clock sample and print the current state
    Status,
    /// Pause: free mode asks whether to time the break, interval pauses directly
    Pause,
    /// Time the break actively (answers the pause prompt)
    Break,
    /// Resume a paused session, or reopen one awaiting finalization
    Resume,
    /// Replace the session notes
    Note {
        text: String,
    },
    /// End the session and open the editable summary
    End,
    /// Commit the summary, with optional corrections
    Finalize {
        #[arg(long)]
        study_min: Option<i64>,
        #[arg(long)]
        study_sec: Option<i64>,
        #[arg(long)]
        pause_min: Option<i64>,
        #[arg(long)]
        pause_sec: Option<i64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Discard the active session without saving
    Cancel,
    /// Run the timer live: 1s ticks, heartbeat autosaves, Ctrl-C snapshots
    Watch,
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut db = Database::open()?;
    let config = Config::load_or_default();

    match action {
        SessionAction::Start {
            subject,
            topic,
            interval,
            study_minutes,
            break_minutes,
            preset,
        } => start(
            &db,
            &config,
            &subject,
            &topic,
            interval,
            study_minutes,
            break_minutes,
            preset.as_deref(),
        ),
        SessionAction::Status => step(&db, &config, |_| None),
        SessionAction::Pause => step(&db, &config, |timer| {
            let event = timer.pause();
            if timer.run_mode() == RunMode::PausedWaitingDecision {
                eprintln!(
                    "Timed break? `studium session break` times it, \
                     `studium session pause` again just pauses."
                );
            }
            event
        }),
        SessionAction::Break => step(&db, &config, |timer| timer.begin_timed_break()),
        SessionAction::Resume => resume(&db, &config),
        SessionAction::Note { text } => step(&db, &config, |timer| {
            timer.set_notes(text);
            None
        }),
        SessionAction::End => end(&db, &config),
        SessionAction::Finalize {
            study_min,
            study_sec,
            pause_min,
            pause_sec,
            notes,
        } => finalize(&mut db, study_min, study_sec, pause_min, pause_sec, notes),
        SessionAction::Cancel => cancel(&db),
        SessionAction::Watch => {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            rt.block_on(watch(&db, &config))
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn start(
    db: &Database,
    config: &Config,
    subject: &str,
    topic: &str,
    interval: bool,
    study_minutes: Option<u64>,
    break_minutes: Option<u64>,
    preset: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    if db.kv_get(TIMER_KEY)?.is_some() {
        return Err("a session is already active; finish or cancel it first".into());
    }
    if db.get_subject(subject)?.is_none() {
        return Err(format!("unknown subject id: {subject}").into());
    }
    if !db.list_topics(subject)?.iter().any(|t| t.id == topic) {
        return Err(format!("topic {topic} does not belong to subject {subject}").into());
    }

    let mode = if interval {
        SessionMode::Interval
    } else {
        SessionMode::Free
    };

    let durations = if let Some(preset_id) = preset {
        let preset = config
            .presets
            .iter()
            .find(|p| p.id == preset_id || p.name == preset_id)
            .ok_or_else(|| format!("unknown preset: {preset_id}"))?;
        IntervalConfig::new(preset.study_minutes, preset.break_minutes)?
    } else {
        let defaults = config.interval_defaults();
        IntervalConfig::new(
            study_minutes.unwrap_or(defaults.study_minutes),
            break_minutes.unwrap_or(defaults.break_minutes),
        )?
    };

    let now = now_ms();
    let (timer, event) = SessionTimer::start(subject, topic, mode, durations, Utc::now(), now);
    let coordinator = AutosaveCoordinator::new(config.autosave.interval_secs, now);

    save_timer(db, &timer)?;
    save_coordinator(db, &coordinator)?;
    db.kv_delete(SUMMARY_KEY)?;

    println!("{}", serde_json::to_string_pretty(&event)?);
    Ok(())
}

/// The shared command flow: every invocation is one external trigger.
/// Deliver a fresh clock sample first, give the autosave heartbeat a
/// chance, apply the command, park the state again.
fn step(
    db: &Database,
    config: &Config,
    apply: impl FnOnce(&mut SessionTimer) -> Option<Event>,
) -> Result<(), Box<dyn std::error::Error>> {
    if db.kv_get(SUMMARY_KEY)?.is_some() {
        return Err(
            "session is awaiting finalization; `studium session finalize` or `resume`".into(),
        );
    }
    let mut timer = load_timer(db)?.ok_or("no active session")?;
    let mut coordinator = load_coordinator(db, config);

    let now = now_ms();
    let phase_event = timer.tick(now);
    if config.autosave.enabled {
        if let Some(draft) = coordinator.poll(now, &timer) {
            coordinator.commit(db, &draft);
        }
    }
    let event = apply(&mut timer);

    save_timer(db, &timer)?;
    save_coordinator(db, &coordinator)?;

    if let Some(e) = phase_event {
        println!("{}", serde_json::to_string_pretty(&e)?);
    }
    match event {
        Some(e) => println!("{}", serde_json::to_string_pretty(&e)?),
        None => println!("{}", serde_json::to_string_pretty(&timer.snapshot())?),
    }
    Ok(())
}

/// `resume` doubles as the summary escape hatch: with a summary pending it
/// discards the review and reopens the running timer, charging the gap to
/// neither counter.
fn resume(db: &Database, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if db.kv_get(SUMMARY_KEY)?.is_some() {
        let mut timer = load_timer(db)?.ok_or("no active session")?;
        db.kv_delete(SUMMARY_KEY)?;
        let event = timer.reopen(now_ms());
        save_timer(db, &timer)?;
        println!("{}", serde_json::to_string_pretty(&event)?);
        return Ok(());
    }
    step(db, config, |timer| timer.resume())
}

fn end(db: &Database, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if db.kv_get(SUMMARY_KEY)?.is_some() {
        return Err("session already awaiting finalization".into());
    }
    let mut timer = load_timer(db)?.ok_or("no active session")?;
    let coordinator = load_coordinator(db, config);

    let now = now_ms();
    timer.tick(now);

    let summary = SessionSummary::from_timer(&timer);
    db.kv_set(SUMMARY_KEY, &serde_json::to_string(&summary)?)?;
    save_timer(db, &timer)?;
    save_coordinator(db, &coordinator)?;

    let event = Event::SessionEnded {
        duration_secs: summary.study_secs(),
        pause_secs: summary.pause_secs(),
        at: Utc::now(),
    };
    println!("{}", serde_json::to_string_pretty(&event)?);
    eprintln!(
        "Review the values, then `studium session finalize` -- or \
         `studium session resume` if this was a mistake."
    );
    Ok(())
}

fn finalize(
    db: &mut Database,
    study_min: Option<i64>,
    study_sec: Option<i64>,
    pause_min: Option<i64>,
    pause_sec: Option<i64>,
    notes: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let parked = db
        .kv_get(SUMMARY_KEY)?
        .ok_or("nothing to finalize; `studium session end` first")?;
    let mut summary: SessionSummary = serde_json::from_str(&parked)?;

    if let Some(v) = study_min {
        summary.set_study_minutes(v);
    }
    if let Some(v) = study_sec {
        summary.set_study_seconds(v);
    }
    if let Some(v) = pause_min {
        summary.set_pause_minutes(v);
    }
    if let Some(v) = pause_sec {
        summary.set_pause_seconds(v);
    }
    if let Some(text) = notes {
        summary.set_notes(text);
    }

    let coordinator = load_coordinator(db, &Config::load_or_default());
    let draft = summary.finalize(Utc::now());
    // The edited record supersedes any autosave checkpoint for this run.
    let session_id = match coordinator.saved_row() {
        Some(id) => {
            db.update_session(id, &draft)?;
            id
        }
        None => db.insert_session(&draft)?,
    };

    db.kv_delete(TIMER_KEY)?;
    db.kv_delete(AUTOSAVE_KEY)?;
    db.kv_delete(SUMMARY_KEY)?;

    let event = Event::SessionFinalized {
        session_id,
        duration_secs: draft.duration_secs,
        pause_secs: draft.pause_secs,
        at: draft.date,
    };
    println!("{}", serde_json::to_string_pretty(&event)?);
    Ok(())
}

fn cancel(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    if db.kv_get(TIMER_KEY)?.is_none() {
        return Err("no active session".into());
    }
    db.kv_delete(TIMER_KEY)?;
    db.kv_delete(AUTOSAVE_KEY)?;
    db.kv_delete(SUMMARY_KEY)?;
    eprintln!("Session discarded.");
    Ok(())
}

/// Live loop: scheduled 1s ticks plus a Ctrl-C teardown path that writes
/// the emergency snapshot before exiting. The session stays parked and
/// resumable afterwards, like a closed tab.
async fn watch(db: &Database, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if db.kv_get(SUMMARY_KEY)?.is_some() {
        return Err(
            "session is awaiting finalization; `studium session finalize` or `resume`".into(),
        );
    }
    let mut timer = load_timer(db)?.ok_or("no active session")?;
    let mut coordinator = load_coordinator(db, config);

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = now_ms();
                if let Some(event) = timer.tick(now) {
                    println!("\r{}", serde_json::to_string(&event)?);
                }
                if config.autosave.enabled {
                    if let Some(draft) = coordinator.poll(now, &timer) {
                        coordinator.commit(db, &draft);
                        // Park the live state alongside the checkpoint so a
                        // hard kill loses at most one heartbeat interval.
                        save_timer(db, &timer)?;
                        save_coordinator(db, &coordinator)?;
                    }
                }
                print!("\r{}", status_line(&timer));
                std::io::stdout().flush()?;
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("interrupt received, writing shutdown snapshot");
                let draft = coordinator.shutdown_draft(&timer);
                coordinator.commit(db, &draft);
                break;
            }
        }
    }

    save_timer(db, &timer)?;
    save_coordinator(db, &coordinator)?;
    println!();
    eprintln!("Session parked; pick it up with `studium session status`.");
    Ok(())
}

fn status_line(timer: &SessionTimer) -> String {
    let state = match timer.run_mode() {
        RunMode::Running => match (timer.mode(), timer.phase()) {
            (SessionMode::Interval, Phase::Break) => "break phase",
            (SessionMode::Interval, Phase::Study) => "study phase",
            (SessionMode::Free, _) => "running",
        },
        RunMode::PausedWaitingDecision => "awaiting break decision",
        RunMode::PausedManual => "paused",
        RunMode::BreakActive => "on a timed break",
    };
    format!(
        "study {} | pause {} | {} [{}]",
        fmt_mmss(timer.elapsed_study_secs()),
        fmt_mmss(timer.elapsed_pause_secs()),
        fmt_mmss(timer.display_secs()),
        state,
    )
}

fn fmt_mmss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

// ── kv parking ───────────────────────────────────────────────────────

fn load_timer(db: &Database) -> Result<Option<SessionTimer>, Box<dyn std::error::Error>> {
    match db.kv_get(TIMER_KEY)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

fn save_timer(db: &Database, timer: &SessionTimer) -> Result<(), Box<dyn std::error::Error>> {
    db.kv_set(TIMER_KEY, &serde_json::to_string(timer)?)?;
    Ok(())
}

fn load_coordinator(db: &Database, config: &Config) -> AutosaveCoordinator {
    if let Ok(Some(json)) = db.kv_get(AUTOSAVE_KEY) {
        if let Ok(coordinator) = serde_json::from_str(&json) {
            return coordinator;
        }
    }
    AutosaveCoordinator::new(config.autosave.interval_secs, now_ms())
}

fn save_coordinator(
    db: &Database,
    coordinator: &AutosaveCoordinator,
) -> Result<(), Box<dyn std::error::Error>> {
    db.kv_set(AUTOSAVE_KEY, &serde_json::to_string(coordinator)?)?;
    Ok(())
}

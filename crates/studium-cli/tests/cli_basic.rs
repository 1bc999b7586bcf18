//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the dev data
//! directory and verify outputs.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "studium-cli", "--"])
        .args(args)
        .env("STUDIUM_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("stdout was not valid JSON")
}

/// Create a subject and return its id.
fn make_subject(name: &str) -> String {
    let (stdout, _, code) = run_cli(&["subject", "add", name]);
    assert_eq!(code, 0, "subject add failed");
    json(&stdout)["id"].as_str().unwrap().to_string()
}

/// Create a topic under the subject and return its id.
fn make_topic(subject_id: &str, name: &str) -> String {
    let (stdout, _, code) = run_cli(&["topic", "add", "--subject", subject_id, name]);
    assert_eq!(code, 0, "topic add failed");
    json(&stdout)["id"].as_str().unwrap().to_string()
}

#[test]
fn test_subject_add_and_list() {
    let id = make_subject("CLI Subject");
    let (stdout, _, code) = run_cli(&["subject", "list"]);
    assert_eq!(code, 0, "subject list failed");
    let subjects = json(&stdout);
    assert!(subjects
        .as_array()
        .unwrap()
        .iter()
        .any(|s| s["id"] == id.as_str()));
}

#[test]
fn test_subject_archive_hides_from_default_list() {
    let id = make_subject("Archive Me");
    let (_, _, code) = run_cli(&["subject", "archive", &id]);
    assert_eq!(code, 0, "subject archive failed");

    let (stdout, _, _) = run_cli(&["subject", "list"]);
    assert!(!json(&stdout)
        .as_array()
        .unwrap()
        .iter()
        .any(|s| s["id"] == id.as_str()));

    let (stdout, _, _) = run_cli(&["subject", "list", "--archived"]);
    assert!(json(&stdout)
        .as_array()
        .unwrap()
        .iter()
        .any(|s| s["id"] == id.as_str()));
}

#[test]
fn test_topic_lifecycle() {
    let subject = make_subject("Topic Host");
    let topic = make_topic(&subject, "Chapter 1");

    let (_, _, code) = run_cli(&["topic", "done", &topic]);
    assert_eq!(code, 0, "topic done failed");

    let (stdout, _, _) = run_cli(&["topic", "list", "--subject", &subject]);
    let topics = json(&stdout);
    let entry = topics
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["id"] == topic.as_str())
        .expect("topic missing from list");
    assert_eq!(entry["completed"], true);

    let (_, _, code) = run_cli(&["topic", "remove", &topic]);
    assert_eq!(code, 0, "topic remove failed");
}

#[test]
fn test_topic_add_rejects_unknown_subject() {
    let (_, stderr, code) = run_cli(&["topic", "add", "--subject", "nope", "Orphan"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown subject"));
}

/// The session state is a singleton, so the whole lifecycle runs as one
/// sequential test: any leftover session is cancelled first.
#[test]
fn test_session_lifecycle() {
    let _ = run_cli(&["session", "cancel"]);

    let subject = make_subject("Session Subject");
    let topic = make_topic(&subject, "Session Topic");

    let (stdout, _, code) = run_cli(&[
        "session", "start", "--subject", &subject, "--topic", &topic,
    ]);
    assert_eq!(code, 0, "session start failed");
    assert_eq!(json(&stdout)["type"], "SessionStarted");

    // A second start is refused while one is active.
    let (_, stderr, code) = run_cli(&[
        "session", "start", "--subject", &subject, "--topic", &topic,
    ]);
    assert_ne!(code, 0);
    assert!(stderr.contains("already active"));

    let (stdout, _, code) = run_cli(&["session", "status"]);
    assert_eq!(code, 0, "session status failed");
    let snapshot = json(&stdout);
    assert_eq!(snapshot["type"], "StateSnapshot");
    assert_eq!(snapshot["run_mode"], "running");

    // Free-mode pause asks for a break decision first.
    let (stdout, _, code) = run_cli(&["session", "pause"]);
    assert_eq!(code, 0, "session pause failed");
    assert_eq!(json(&stdout)["type"], "BreakPromptShown");

    let (stdout, _, code) = run_cli(&["session", "break"]);
    assert_eq!(code, 0, "session break failed");
    assert_eq!(json(&stdout)["type"], "BreakStarted");

    let (stdout, _, code) = run_cli(&["session", "resume"]);
    assert_eq!(code, 0, "session resume failed");
    assert_eq!(json(&stdout)["type"], "Resumed");

    let (_, _, code) = run_cli(&["session", "note", "reviewed flashcards"]);
    assert_eq!(code, 0, "session note failed");

    let (stdout, _, code) = run_cli(&["session", "end"]);
    assert_eq!(code, 0, "session end failed");
    assert_eq!(json(&stdout)["type"], "SessionEnded");

    // Commands other than finalize/resume/cancel are refused now.
    let (_, stderr, code) = run_cli(&["session", "pause"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("awaiting finalization"));

    let (stdout, _, code) = run_cli(&[
        "session",
        "finalize",
        "--study-min",
        "2",
        "--study-sec",
        "10",
        "--notes",
        "edited in review",
    ]);
    assert_eq!(code, 0, "session finalize failed");
    let finalized = json(&stdout);
    assert_eq!(finalized["type"], "SessionFinalized");
    assert_eq!(finalized["duration_secs"], 130);

    let session_id = finalized["session_id"].as_i64().unwrap();
    let (stdout, _, _) = run_cli(&["stats", "sessions", "--subject", &subject]);
    let sessions = json(&stdout);
    let row = sessions
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["id"].as_i64() == Some(session_id))
        .expect("finalized session missing");
    assert_eq!(row["notes"], "edited in review");

    // Gone: there is nothing left to finalize or cancel.
    let (_, _, code) = run_cli(&["session", "status"]);
    assert_ne!(code, 0);
}

#[test]
fn test_stats_today_and_all() {
    let (stdout, _, code) = run_cli(&["stats", "today"]);
    assert_eq!(code, 0, "stats today failed");
    assert!(json(&stdout)["total_sessions"].is_number());

    let (stdout, _, code) = run_cli(&["stats", "all"]);
    assert_eq!(code, 0, "stats all failed");
    assert!(json(&stdout)["total_study_secs"].is_number());
}

#[test]
fn test_preset_add_list_remove() {
    let (stdout, _, code) = run_cli(&[
        "preset", "add", "Deep Work", "--study", "50", "--break", "10",
    ]);
    assert_eq!(code, 0, "preset add failed");
    let id = json(&stdout)["id"].as_str().unwrap().to_string();

    let (stdout, _, code) = run_cli(&["preset", "list"]);
    assert_eq!(code, 0, "preset list failed");
    assert!(json(&stdout)
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["id"] == id.as_str()));

    let (_, _, code) = run_cli(&["preset", "remove", &id]);
    assert_eq!(code, 0, "preset remove failed");
}

#[test]
fn test_preset_rejects_zero_durations() {
    let (_, _, code) = run_cli(&["preset", "add", "Broken", "--study", "0", "--break", "5"]);
    assert_ne!(code, 0);
}

#[test]
fn test_config_get_and_set() {
    let (stdout, _, code) = run_cli(&["config", "get", "timer.study_minutes"]);
    assert_eq!(code, 0, "config get failed");
    assert!(!stdout.trim().is_empty());

    let (_, _, code) = run_cli(&["config", "set", "ui.clock_style", "digital"]);
    assert_eq!(code, 0, "config set failed");
    let (stdout, _, _) = run_cli(&["config", "get", "ui.clock_style"]);
    assert_eq!(stdout.trim(), "digital");
}

#[test]
fn test_config_rejects_unknown_key() {
    let (_, stderr, code) = run_cli(&["config", "get", "no.such.key"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown config key"));
}

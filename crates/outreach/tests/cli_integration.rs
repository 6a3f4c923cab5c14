//! CLI integration tests for the outreach command-line interface.
//!
//! These tests verify:
//! - Help text is displayed correctly
//! - Workflows are loaded, validated, and run from the working directory
//! - Failures exit non-zero with a useful message
//!
//! Every test runs in its own temp directory with `OUTREACH_CONFIG_DIR`
//! pointed there, so no user settings or log files are touched.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for the outreach binary, isolated in `dir`.
fn outreach(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("outreach").unwrap();
    cmd.current_dir(dir)
        .env("OUTREACH_CONFIG_DIR", dir.join("config"))
        .env_remove("COHERE_API_KEY")
        .env_remove("SENDGRID_API_KEY");
    cmd
}

fn workspace(workflow: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("workflow.json"), workflow).unwrap();
    dir
}

const SEARCH_ONLY: &str = r#"{
    "name": "search-only",
    "steps": [
        { "id": "search", "agent": "ProspectSearchAgent", "icp": { "industry": "SaaS" } },
        { "id": "mystery", "agent": "NotYetBuiltAgent" }
    ]
}"#;

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    outreach(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("graph"))
        .stdout(predicate::str::contains("agents"));
}

#[test]
fn test_version_displays() {
    let dir = TempDir::new().unwrap();
    outreach(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("outreach"));
}

#[test]
fn test_run_help_shows_options() {
    let dir = TempDir::new().unwrap();
    outreach(dir.path())
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--workflow"))
        .stdout(predicate::str::contains("--state"))
        .stdout(predicate::str::contains("--timeout"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Agents
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_agents_json_lists_builtins() {
    let dir = TempDir::new().unwrap();
    outreach(dir.path())
        .args(["--json", "agents"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ProspectSearchAgent"))
        .stdout(predicate::str::contains("FeedbackTrainerAgent"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Validate
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_validate_reports_placeholder_steps() {
    let dir = workspace(SEARCH_ONLY);
    outreach(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("search-only"))
        .stdout(predicate::str::contains("NotYetBuiltAgent"));
}

#[test]
fn test_validate_strict_fails_on_placeholder_steps() {
    let dir = workspace(SEARCH_ONLY);
    outreach(dir.path())
        .args(["validate", "--strict"])
        .assert()
        .failure();
}

#[test]
fn test_validate_reports_unresolved_secrets() {
    let dir = workspace(
        r#"{ "steps": [ { "id": "content", "agent": "OutreachContentAgent",
             "tools": [ { "name": "Cohere", "config": { "api_key": "{{COHERE_API_KEY}}" } } ] } ] }"#,
    );
    outreach(dir.path())
        .args(["--json", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("COHERE_API_KEY"));
}

#[test]
fn test_validate_missing_workflow_fails() {
    let dir = TempDir::new().unwrap();
    outreach(dir.path())
        .args(["validate", "--workflow", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.json"));
}

#[test]
fn test_validate_empty_workflow_fails() {
    let dir = workspace(r#"{ "steps": [] }"#);
    outreach(dir.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no steps"));
}

#[test]
fn test_validate_malformed_workflow_fails() {
    let dir = workspace("{ not json");
    outreach(dir.path()).arg("validate").assert().failure();
}

#[test]
fn test_settings_file_selects_workflow() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("custom.json"), SEARCH_ONLY).unwrap();
    std::fs::write(
        dir.path().join("outreach.toml"),
        "[pipeline]\nworkflow = \"custom.json\"\n\n[logging]\nfile = false\n",
    )
    .unwrap();

    outreach(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.json"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Graph
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_graph_json_ends_at_end() {
    let dir = workspace(SEARCH_ONLY);
    outreach(dir.path())
        .args(["--json", "graph"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"entry\": \"search\""))
        .stdout(predicate::str::contains("\"to\": \"END\""));
}

// ─────────────────────────────────────────────────────────────────────────────
// Run
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_run_prints_final_state() {
    let dir = workspace(SEARCH_ONLY);
    outreach(dir.path())
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Alex Chen"))
        .stdout(predicate::str::contains("brenda.r@datasolutions.com"));
}

#[test]
fn test_run_json_includes_report() {
    let dir = workspace(SEARCH_ONLY);
    outreach(dir.path())
        .args(["--json", "run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"run_id\""))
        .stdout(predicate::str::contains("\"status\": \"placeholder\""));
}

#[test]
fn test_run_keeps_initial_state() {
    let dir = workspace(SEARCH_ONLY);
    std::fs::write(
        dir.path().join("state.json"),
        r#"{ "campaign_owner": "pat@example.com" }"#,
    )
    .unwrap();

    outreach(dir.path())
        .args(["run", "--state", "state.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pat@example.com"))
        .stdout(predicate::str::contains("Alex Chen"));
}

#[test]
fn test_run_rejects_non_object_state() {
    let dir = workspace(SEARCH_ONLY);
    std::fs::write(dir.path().join("state.json"), "[1, 2, 3]").unwrap();

    outreach(dir.path())
        .args(["run", "--state", "state.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid initial state"));
}

#[test]
fn test_run_zero_timeout_disables_timeout() {
    let dir = workspace(
        r#"{ "steps": [ { "id": "search", "agent": "ProspectSearchAgent", "latency_ms": 50 } ] }"#,
    );
    std::fs::write(
        dir.path().join("outreach.toml"),
        "[pipeline]\nstep_timeout_secs = 0\n\n[logging]\nfile = false\n",
    )
    .unwrap();

    outreach(dir.path())
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Alex Chen"));
    outreach(dir.path())
        .args(["run", "--timeout", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alex Chen"));
}

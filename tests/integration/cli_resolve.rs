//! End-to-end tests for the prefetch binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const MANIFEST: &str = r#"{
    "name": "profile",
    "root": {
        "type": "element",
        "name": "App",
        "children": [
            { "type": "async", "id": "user", "value": "alice", "delay_ms": 2,
              "renders": [
                { "type": "element", "name": "Hello {value}" },
                { "type": "async", "id": "feed" }
              ] },
            { "type": "async", "id": "ads", "defer": true }
        ]
    }
}"#;

fn run(temp_dir: &TempDir, workspace: &Path, args: &[&str]) -> Output {
    let home = temp_dir.path().join("home");
    fs::create_dir_all(&home).unwrap();
    let bin = env!("CARGO_BIN_EXE_prefetch");
    Command::new(bin)
        .env("HOME", &home)
        .env("XDG_CONFIG_HOME", temp_dir.path().join("xdg"))
        .env_remove("PREFETCH_LOG")
        .env_remove("PREFETCH_LOG_FORMAT")
        .env_remove("PREFETCH_LOG_OUTPUT")
        .env_remove("PREFETCH_LOG_MODULES")
        .env_remove("PREFETCH_ENV")
        .arg("--workspace")
        .arg(workspace)
        .args(args)
        .output()
        .unwrap()
}

fn workspace(temp_dir: &TempDir) -> std::path::PathBuf {
    let ws = temp_dir.path().join("ws");
    fs::create_dir_all(&ws).unwrap();
    fs::write(ws.join("tree.json"), MANIFEST).unwrap();
    ws
}

#[test]
fn test_resolve_then_rehydrate() {
    let temp_dir = TempDir::new().unwrap();
    let ws = workspace(&temp_dir);

    let output = run(
        &temp_dir,
        &ws,
        &["--quiet", "resolve", "tree.json", "--save", "state.json", "--outline"],
    );
    assert!(
        output.status.success(),
        "resolve should succeed: stderr={:?}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(r#"{"resolved":{"feed":true,"user":true}}"#));
    assert!(stdout.contains("Hello alice"));
    assert!(stdout.contains("[ads] (deferred)"));

    let saved = fs::read_to_string(ws.join("state.json")).unwrap();
    assert_eq!(saved, r#"{"resolved":{"feed":true,"user":true}}"#);

    let output = run(
        &temp_dir,
        &ws,
        &["--quiet", "resolve", "tree.json", "--state", "state.json", "--format", "json"],
    );
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["state"]["resolved"]["user"], true);
    assert_eq!(value["state"]["resolved"]["feed"], true);
    assert!(value["state"]["resolved"].get("ads").is_none());
    assert_eq!(value["report"]["rehydrated"], true);
    assert_eq!(value["report"]["dependencies"]["ads"], "skipped_not_rehydrated");
    assert_eq!(value["rehydration"]["user"], false);
    assert_eq!(
        value["state_identifier"],
        "__ASYNC_COMPONENTS_REHYDRATE_STATE__"
    );
}

#[test]
fn test_failed_dependency_still_exits_successfully() {
    let temp_dir = TempDir::new().unwrap();
    let ws = temp_dir.path().join("ws");
    fs::create_dir_all(&ws).unwrap();
    fs::write(
        ws.join("tree.toml"),
        r#"
[root]
type = "element"
name = "App"

[[root.children]]
type = "async"
id = "ok"

[[root.children]]
type = "async"
id = "down"
delay_ms = 5
fail = "service unavailable"
"#,
    )
    .unwrap();

    let output = run(&temp_dir, &ws, &["--quiet", "resolve", "tree.toml", "--format", "json"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["state"]["resolved"]["ok"], true);
    assert!(value["state"]["resolved"].get("down").is_none());
    assert!(value["report"]["failure"]
        .as_str()
        .unwrap()
        .contains("down"));
}

#[test]
fn test_check_rejects_duplicates() {
    let temp_dir = TempDir::new().unwrap();
    let ws = workspace(&temp_dir);

    let output = run(&temp_dir, &ws, &["--quiet", "check", "tree.json"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("3 dependencies, no duplicate ids"));

    fs::write(
        ws.join("dup.json"),
        r#"{"root":{"type":"element","name":"App","children":[
            {"type":"async","id":"X"},{"type":"async","id":"X"}]}}"#,
    )
    .unwrap();
    let output = run(&temp_dir, &ws, &["--quiet", "check", "dup.json"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Duplicate dependency ids: X"));
}

#[test]
fn test_logs_go_to_stderr() {
    let temp_dir = TempDir::new().unwrap();
    let ws = workspace(&temp_dir);

    let output = run(
        &temp_dir,
        &ws,
        &["--log-output", "stderr", "--log-format", "json", "resolve", "tree.json"],
    );
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Prefetch CLI starting"));
    assert!(stderr.contains("Dependency resolution finished"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Prefetch CLI starting"));
}

//! CLI behaviour that needs neither `gh` nor a git checkout.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn todosync(root: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("todosync"));
    cmd.current_dir(root)
        .env_remove("GITHUB_REPOSITORY")
        .env_remove("EVENT_TYPE")
        .env_remove("CHANGED_FILES")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn init_writes_config_and_docs_dir() {
    let root = TempDir::new().expect("root");
    todosync(root.path())
        .args(["init", "--repo", "acme/widgets"])
        .assert()
        .success()
        .stdout(contains("wrote .todosync.yaml"));

    let config = fs::read_to_string(root.path().join(".todosync.yaml")).expect("config");
    assert!(config.contains("acme/widgets"));
    assert!(root.path().join(".github/issues").is_dir());

    todosync(root.path())
        .args(["init", "--repo", "other/repo"])
        .assert()
        .success()
        .stdout(contains("left unchanged"));
    let again = fs::read_to_string(root.path().join(".todosync.yaml")).expect("config");
    assert_eq!(config, again);
}

#[test]
fn init_flags_existing_code_origin_documents() {
    let root = TempDir::new().expect("root");
    fs::create_dir_all(root.path().join(".github/issues")).unwrap();
    fs::write(
        root.path().join(".github/issues/3-todo-0123456789ab-legacy.md"),
        "legacy\n",
    )
    .unwrap();

    todosync(root.path())
        .arg("init")
        .assert()
        .success()
        .stdout(contains("1 code-origin document(s) already present").and(contains("SHA-256")));
}

#[test]
fn scan_write_dry_run_reports_without_writing() {
    let root = TempDir::new().expect("root");
    fs::write(root.path().join("app.py"), "# TODO: add tests\n").unwrap();

    todosync(root.path())
        .args(["scan", "--write", "--dry-run"])
        .assert()
        .success()
        .stdout(contains("[dry-run] Scan summary:").and(contains("Created:       1")));
    assert!(!root.path().join(".github/issues").exists());

    todosync(root.path())
        .args(["scan", "--dry-run"])
        .assert()
        .failure();
}

#[test]
fn scan_json_lists_markers_outside_the_docs_dir() {
    let root = TempDir::new().expect("root");
    fs::create_dir_all(root.path().join("src")).unwrap();
    fs::write(root.path().join("src/lib.rs"), "// TODO: fix race condition\n").unwrap();
    fs::create_dir_all(root.path().join(".github/issues")).unwrap();
    fs::write(
        root.path().join(".github/issues/todo-0123456789ab-x.md"),
        "## TODO from Code\n",
    )
    .unwrap();

    let output = todosync(root.path())
        .args(["scan", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let markers: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let markers = markers.as_array().expect("array");
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0]["text"], "fix race condition");
    assert_eq!(markers[0]["source_file"], "src/lib.rs");
    assert_eq!(markers[0]["line"], 1);
    assert_eq!(markers[0]["identity"].as_str().map(str::len), Some(12));
}

#[test]
fn scan_table_reports_empty_tree() {
    let root = TempDir::new().expect("root");
    todosync(root.path())
        .args(["scan"])
        .assert()
        .success()
        .stdout(contains("No TODO markers found."));
}

#[test]
fn malformed_config_fails_with_path() {
    let root = TempDir::new().expect("root");
    fs::write(root.path().join(".todosync.yaml"), "push: [not, a, bool]\n").unwrap();
    todosync(root.path())
        .args(["scan"])
        .assert()
        .code(1)
        .stderr(contains(".todosync.yaml"));
}

#[test]
fn unknown_event_is_rejected() {
    let root = TempDir::new().expect("root");
    todosync(root.path())
        .args(["sync", "--event", "schedule"])
        .assert()
        .failure()
        .stderr(contains("unknown trigger").and(contains("push, manual")));
}

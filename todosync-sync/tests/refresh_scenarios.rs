//! Document-only refresh runs against a temp repository and a recording VCS.

mod common;

use std::path::Path;

use tempfile::TempDir;

use todosync_core::{CodeMarker, Config};
use todosync_docs::store;
use todosync_sync::{refresh_documents, RefreshTally};

use common::{doc_names, init_logging, write_file, RecordingVcs};

const DOCS: &str = ".github/issues";

#[test]
fn new_markers_get_documents_and_one_commit() {
    init_logging();
    let root = TempDir::new().unwrap();
    write_file(root.path(), "src/lib.rs", "// TODO: fix race condition\n");
    write_file(root.path(), "app.py", "# TODO: add tests\n");
    let vcs = RecordingVcs::new(root.path());

    let outcome = refresh_documents(root.path(), &Config::default(), &vcs, false).unwrap();

    assert_eq!(
        outcome.tally,
        RefreshTally {
            markers: 2,
            created: 2,
            updated: 0,
            unchanged: 0,
        }
    );
    assert!(outcome.committed);
    assert_eq!(doc_names(root.path(), DOCS).len(), 2);

    let ops = vcs.ops();
    assert_eq!(ops.len(), 3);
    assert!(ops[..2].iter().all(|op| op.starts_with(&format!("add {DOCS}/todo-"))));
    assert_eq!(ops[2], "commit Sync TODOs from code: 2 created, 0 updated");
}

#[test]
fn second_refresh_changes_nothing() {
    init_logging();
    let root = TempDir::new().unwrap();
    write_file(root.path(), "src/lib.rs", "// TODO: fix race condition\n");
    let vcs = RecordingVcs::new(root.path());
    refresh_documents(root.path(), &Config::default(), &vcs, false).unwrap();
    let ops_before = vcs.ops().len();

    let outcome = refresh_documents(root.path(), &Config::default(), &vcs, false).unwrap();
    assert_eq!(outcome.tally.unchanged, 1);
    assert_eq!(outcome.tally.changes(), 0);
    assert!(!outcome.committed);
    assert_eq!(vcs.ops().len(), ops_before);
}

#[test]
fn outdated_document_is_regenerated_in_place() {
    init_logging();
    let root = TempDir::new().unwrap();
    write_file(root.path(), "src/lib.rs", "// TODO: fix race condition\n");
    let marker = CodeMarker::new("src/lib.rs", 1, "fix race condition");
    let name = format!("7-todo-{}-fix-race-condition.md", marker.identity);
    write_file(
        root.path(),
        &format!("{DOCS}/{name}"),
        "---\ntitle: fix race condition\nlabels: [todo]\nassignees: [octocat]\nmilestone: v2\n---\nold body\n",
    );
    let vcs = RecordingVcs::new(root.path());

    let outcome = refresh_documents(root.path(), &Config::default(), &vcs, false).unwrap();
    assert_eq!(outcome.tally.updated, 1);
    assert_eq!(outcome.tally.created, 0);
    assert_eq!(doc_names(root.path(), DOCS), vec![name.clone()]);
    assert_eq!(
        vcs.ops().last().map(String::as_str),
        Some("commit Sync TODOs from code: 0 created, 1 updated")
    );

    let doc = store::read_document(root.path(), &Path::new(DOCS).join(&name)).unwrap();
    assert_eq!(doc.metadata.labels, vec!["todo", "rust", "bug"]);
    assert_eq!(doc.metadata.assignees, vec!["octocat"]);
    assert!(doc.metadata.extra.contains_key("milestone"));
    assert!(doc.body.starts_with("## TODO from Code"));
}

#[test]
fn dry_run_writes_and_stages_nothing() {
    init_logging();
    let root = TempDir::new().unwrap();
    write_file(root.path(), "src/lib.rs", "// TODO: fix race condition\n");
    let vcs = RecordingVcs::new(root.path());

    let outcome = refresh_documents(root.path(), &Config::default(), &vcs, true).unwrap();
    assert!(outcome.dry_run);
    assert_eq!(outcome.tally.created, 1);
    assert_eq!(outcome.documents.len(), 1);
    assert!(!outcome.committed);
    assert!(vcs.ops().is_empty());
    assert!(doc_names(root.path(), DOCS).is_empty());
}

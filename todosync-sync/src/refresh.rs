//! Document-only refresh: bring work documents in line with the TODO markers
//! in the source tree without talking to the tracker.
//!
//! New markers get a generated document. A marker whose document no longer
//! matches what the generator produces (title, labels or body) has that
//! document rewritten in place, keeping its filename, assignees and any
//! unrecognised metadata keys. Everything written is staged and committed
//! once, without the skip-automation suffix, so the commit itself can start
//! a full sync.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Serialize;

use todosync_core::{Config, Identity, WorkDocument};
use todosync_docs::{store, DocumentGenerator};

use crate::error::SyncError;
use crate::pipeline::scan_markers;
use crate::vcs::Vcs;

/// Counts from one refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshTally {
    /// Distinct markers found.
    pub markers: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl RefreshTally {
    pub fn changes(&self) -> usize {
        self.created + self.updated
    }
}

/// What a refresh did.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub tally: RefreshTally,
    /// Documents written (or, on a dry run, that would be written).
    pub documents: Vec<PathBuf>,
    pub committed: bool,
    pub dry_run: bool,
}

/// Commit message for a refresh that changed something.
pub fn refresh_commit_message(tally: &RefreshTally) -> String {
    format!(
        "Sync TODOs from code: {} created, {} updated",
        tally.created, tally.updated
    )
}

/// Generate and regenerate code-origin documents for the repository at
/// `root`, then commit them. With `dry_run` nothing is written or staged.
pub fn refresh_documents(
    root: &Path,
    config: &Config,
    vcs: &dyn Vcs,
    dry_run: bool,
) -> Result<RefreshOutcome, SyncError> {
    let markers = scan_markers(root, config)?;
    let mut documents = store::list_documents(root, &config.docs_dir)?;
    documents.sort_by(|a, b| a.filename.cmp(&b.filename));

    let mut existing: BTreeMap<&Identity, &WorkDocument> = BTreeMap::new();
    for doc in &documents {
        if let Some(id) = &doc.identity {
            existing.entry(id).or_insert(doc);
        }
    }

    let generator = DocumentGenerator::new()?;
    let mut tally = RefreshTally::default();
    let mut written = Vec::new();
    let mut seen: BTreeSet<&Identity> = BTreeSet::new();

    for marker in &markers {
        if !seen.insert(&marker.identity) {
            continue;
        }
        tally.markers += 1;
        let generated = generator.generate(marker, &config.docs_dir)?;

        let target = match existing.get(&marker.identity) {
            None => {
                tally.created += 1;
                tracing::info!("creating {}", generated.path.display());
                generated
            }
            Some(doc) if is_current(doc, &generated) => {
                tally.unchanged += 1;
                continue;
            }
            Some(doc) => {
                tally.updated += 1;
                tracing::info!("regenerating {}", doc.path.display());
                regenerated(doc, generated)
            }
        };

        if !dry_run {
            store::write_document(root, &target)?;
            vcs.stage(&target.path)?;
        }
        written.push(target.path);
    }

    let mut committed = false;
    if dry_run {
        for path in &written {
            tracing::info!("[dry-run] write {}", path.display());
        }
    } else if vcs.has_staged_changes()? {
        let message = refresh_commit_message(&tally);
        vcs.commit(&message, false)?;
        committed = true;
        tracing::info!("committed: {message}");
    } else {
        tracing::info!("documents already match the source tree");
    }

    Ok(RefreshOutcome {
        tally,
        documents: written,
        committed,
        dry_run,
    })
}

fn is_current(doc: &WorkDocument, generated: &WorkDocument) -> bool {
    doc.metadata.title == generated.metadata.title
        && doc.metadata.labels == generated.metadata.labels
        && doc.body == generated.body
}

/// `doc` with the generator's title, labels and body.
fn regenerated(doc: &WorkDocument, generated: WorkDocument) -> WorkDocument {
    let mut doc = doc.clone();
    doc.metadata.title = generated.metadata.title;
    doc.metadata.labels = generated.metadata.labels;
    doc.body = generated.body;
    doc
}

//! Run pipeline shared by `todosync status` and `todosync sync`.
//!
//! auth check → snapshots → [`engine::plan`] → [`engine::apply`] → one
//! commit (and push) if anything was staged.

use std::path::{Path, PathBuf};

use serde::Serialize;

use todosync_core::{CodeMarker, Config, RunContext};
use todosync_docs::store;

use crate::engine::{self, Plan, Snapshot, Tally};
use crate::error::{io_err, SyncError};
use crate::tracker::Tracker;
use crate::vcs::Vcs;

/// Switches for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Plan only; touch nothing.
    pub dry_run: bool,
    /// Push after committing. Also requires `push: true` in the config.
    pub push: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            push: true,
        }
    }
}

/// What a run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub plan: Plan,
    pub staged: Vec<PathBuf>,
    pub committed: bool,
    pub pushed: bool,
    pub dry_run: bool,
}

/// Fail with [`SyncError::NotAuthenticated`] unless the tracker is usable.
pub fn ensure_authenticated(tracker: &dyn Tracker) -> Result<(), SyncError> {
    if tracker.check_authenticated()? {
        Ok(())
    } else {
        Err(SyncError::NotAuthenticated)
    }
}

/// Scan `root` for markers, skipping the configured excludes and the
/// documents directory.
pub fn scan_markers(root: &Path, config: &Config) -> Result<Vec<CodeMarker>, SyncError> {
    std::fs::metadata(root).map_err(|e| io_err(root, e))?;

    let mut excludes = config.exclude.clone();
    excludes.push(config.docs_dir.clone());
    Ok(todosync_scanner::scan(root, &excludes)?)
}

/// Capture markers, documents and open tickets for the repository at `root`.
///
/// The documents directory is never scanned for markers.
pub fn snapshot(root: &Path, config: &Config, tracker: &dyn Tracker) -> Result<Snapshot, SyncError> {
    let markers = scan_markers(root, config)?;
    let documents = store::list_documents(root, &config.docs_dir)?;
    let tickets = tracker.list_open()?;
    tracing::info!(
        "snapshot: {} marker(s), {} document(s), {} open ticket(s)",
        markers.len(),
        documents.len(),
        tickets.len()
    );
    Ok(Snapshot {
        markers,
        documents,
        tickets,
    })
}

/// Read-only: authenticate, snapshot and plan.
pub fn plan_at(
    root: &Path,
    config: &Config,
    ctx: &RunContext,
    tracker: &dyn Tracker,
) -> Result<Plan, SyncError> {
    ensure_authenticated(tracker)?;
    let snapshot = snapshot(root, config, tracker)?;
    engine::plan(&snapshot, ctx, &config.docs_dir)
}

/// Full run against the repository at `root`.
///
/// `tally` is filled as the run progresses: plan warnings first, then one
/// count per mutation. On error it holds everything done before the failure.
pub fn run(
    root: &Path,
    config: &Config,
    ctx: &RunContext,
    tracker: &dyn Tracker,
    vcs: &dyn Vcs,
    options: RunOptions,
    tally: &mut Tally,
) -> Result<RunOutcome, SyncError> {
    let plan = plan_at(root, config, ctx, tracker)?;
    tally.warnings.extend(plan.warnings.iter().cloned());

    if options.dry_run {
        for step in &plan.steps {
            tracing::info!("[dry-run] {step}");
        }
        return Ok(RunOutcome {
            plan,
            staged: Vec::new(),
            committed: false,
            pushed: false,
            dry_run: true,
        });
    }

    let staged = engine::apply(&plan, root, tracker, vcs, tally)?;

    let mut committed = false;
    let mut pushed = false;
    if vcs.has_staged_changes()? {
        vcs.commit(&config.commit_message, true)?;
        committed = true;
        tracing::info!("committed: {}", config.commit_message);
        if options.push && config.push {
            vcs.push()?;
            pushed = true;
            tracing::info!("pushed");
        }
    } else {
        tracing::info!("nothing staged; no commit");
    }

    Ok(RunOutcome {
        plan,
        staged,
        committed,
        pushed,
        dry_run: false,
    })
}

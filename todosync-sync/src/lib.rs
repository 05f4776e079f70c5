//! # todosync-sync
//!
//! Reconciliation of code markers, work documents and tracker tickets.
//!
//! [`engine::plan`] classifies every work item from a [`Snapshot`] and lists
//! the steps that converge the three systems; [`engine::apply`] executes
//! them. [`pipeline::run`] wraps both with the snapshotting, the
//! authentication check and the final commit. [`refresh::refresh_documents`]
//! is the tracker-free pass that only keeps code-origin documents current.

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod refresh;
pub mod tracker;
pub mod vcs;

pub use engine::{apply, plan, ItemKey, Plan, PlanItem, Snapshot, Step, Tally, CLOSE_COMMENT};
pub use error::SyncError;
pub use pipeline::{run, RunOptions, RunOutcome};
pub use refresh::{refresh_documents, RefreshOutcome, RefreshTally};
pub use tracker::{GhTracker, Tracker, TrackerError};
pub use vcs::{GitVcs, Vcs, VcsError};

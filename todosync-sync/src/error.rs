//! Error types for todosync-sync.

use std::path::PathBuf;

use thiserror::Error;

use todosync_core::ConfigError;
use todosync_docs::DocError;
use todosync_scanner::ScanError;

use crate::tracker::TrackerError;
use crate::vcs::VcsError;

/// Everything that can abort a run.
///
/// Policy warnings are never errors; they are collected on the plan and the
/// tally instead.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The tracker client reports it is not logged in. Raised before any
    /// mutation.
    #[error("tracker client is not authenticated (run `gh auth login`)")]
    NotAuthenticated,

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("document error: {0}")]
    Doc(#[from] DocError),

    #[error("tracker error: {0}")]
    Tracker(#[from] TrackerError),

    #[error("version control error: {0}")]
    Vcs(#[from] VcsError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            SyncError::NotAuthenticated => 2,
            SyncError::Tracker(_) => 3,
            SyncError::Vcs(_) => 4,
            _ => 1,
        }
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

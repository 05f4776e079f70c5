//! Error types for todosync-docs.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from reading, rendering or writing documents.
///
/// Malformed metadata blocks are not errors: they fall back to empty metadata.
#[derive(Debug, Error)]
pub enum DocError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Metadata serialization error (write path).
    #[error("metadata serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Filesystem error, with annotated path for context.
    #[error("document io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`DocError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DocError {
    DocError::Io {
        path: path.into(),
        source,
    }
}

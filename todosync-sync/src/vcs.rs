//! Version-control adapter.
//!
//! A run stages everything it touches and flushes it with one commit at the
//! end. [`GitVcs`] shells out to `git -C <root>`; paths are repository
//! relative.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use thiserror::Error;

/// Appended to the commit message so CI does not re-trigger on our own commit.
pub const SKIP_AUTOMATION_SUFFIX: &str = " [skip ci]";

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("failed to run git: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("`{command}` failed: {stderr}")]
    Command { command: String, stderr: String },
}

/// Operations the engine and pipeline need from version control.
pub trait Vcs {
    fn stage(&self, path: &Path) -> Result<(), VcsError>;

    /// History-preserving rename. The file is moved on disk and the move is
    /// staged.
    fn move_path(&self, from: &Path, to: &Path) -> Result<(), VcsError>;

    fn commit(&self, message: &str, skip_automation: bool) -> Result<(), VcsError>;

    fn push(&self) -> Result<(), VcsError>;

    fn has_staged_changes(&self) -> Result<bool, VcsError>;
}

/// [`Vcs`] backed by the `git` binary.
#[derive(Debug, Clone)]
pub struct GitVcs {
    root: PathBuf,
}

impl GitVcs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn output<I, S>(&self, args: I) -> Result<Output, VcsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(VcsError::Spawn)
    }

    fn run<I, S>(&self, label: &str, args: I) -> Result<(), VcsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let output = self.output(args)?;
        if !output.status.success() {
            return Err(VcsError::Command {
                command: label.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

impl Vcs for GitVcs {
    fn stage(&self, path: &Path) -> Result<(), VcsError> {
        self.run("git add", [Path::new("add"), Path::new("--"), path])
    }

    fn move_path(&self, from: &Path, to: &Path) -> Result<(), VcsError> {
        self.run("git mv", [Path::new("mv"), Path::new("--"), from, to])
    }

    fn commit(&self, message: &str, skip_automation: bool) -> Result<(), VcsError> {
        let message = commit_message(message, skip_automation);
        self.run("git commit", ["commit", "-m", message.as_str()])
    }

    fn push(&self) -> Result<(), VcsError> {
        self.run("git push", ["push"])
    }

    fn has_staged_changes(&self) -> Result<bool, VcsError> {
        let output = self.output(["diff", "--cached", "--quiet"])?;
        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(VcsError::Command {
                command: "git diff --cached --quiet".to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }
}

/// Final commit message, with the skip marker when asked.
pub fn commit_message(message: &str, skip_automation: bool) -> String {
    if skip_automation {
        format!("{message}{SKIP_AUTOMATION_SUFFIX}")
    } else {
        message.to_string()
    }
}

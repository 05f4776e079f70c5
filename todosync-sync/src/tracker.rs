//! Tracker client: the issue tracker as seen by the engine.
//!
//! [`GhTracker`] drives the GitHub CLI (`gh`). Every call is blocking, runs
//! once and surfaces failure as a [`TrackerError`]; nothing is retried here.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use todosync_core::{Ticket, TicketDraft, TicketNumber};

/// Upper bound on open tickets fetched per run.
pub const LIST_LIMIT: usize = 1000;

const LIST_FIELDS: &str = "number,title,body,labels,assignees,state,createdAt,updatedAt";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed: {stderr}")]
    Command { command: String, stderr: String },

    #[error("could not decode tracker response: {0}")]
    Parse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Operations the engine needs from an issue tracker.
pub trait Tracker {
    /// `Ok(false)` when the client runs but is not logged in.
    fn check_authenticated(&self) -> Result<bool, TrackerError>;

    fn list_open(&self) -> Result<Vec<Ticket>, TrackerError>;

    /// Open a ticket. `None` when the tracker did not report a number.
    fn create(&self, draft: &TicketDraft) -> Result<Option<TicketNumber>, TrackerError>;

    fn update(&self, number: TicketNumber, draft: &TicketDraft) -> Result<(), TrackerError>;

    fn close(&self, number: TicketNumber, comment: Option<&str>) -> Result<(), TrackerError>;
}

// ---------------------------------------------------------------------------
// gh implementation
// ---------------------------------------------------------------------------

/// [`Tracker`] backed by the `gh` CLI, run from the repository root.
#[derive(Debug, Clone)]
pub struct GhTracker {
    root: PathBuf,
    /// `owner/name`; `None` lets `gh` infer it from the checkout.
    repo: Option<String>,
}

impl GhTracker {
    pub fn new(root: impl Into<PathBuf>, repo: Option<String>) -> Self {
        Self {
            root: root.into(),
            repo,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("gh");
        cmd.args(args)
            .current_dir(&self.root)
            .env("GH_PROMPT_DISABLED", "1")
            .env("NO_COLOR", "1")
            .stdin(Stdio::null());
        if let Some(repo) = &self.repo {
            cmd.arg("--repo").arg(repo);
        }
        cmd
    }

    /// Run `cmd` and return its stdout, failing on a non-zero exit.
    fn run(&self, mut cmd: Command, label: &str) -> Result<Vec<u8>, TrackerError> {
        let output = spawn(&mut cmd)?;
        if !output.status.success() {
            return Err(TrackerError::Command {
                command: label.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}

impl Tracker for GhTracker {
    fn check_authenticated(&self) -> Result<bool, TrackerError> {
        let mut cmd = Command::new("gh");
        cmd.args(["auth", "status"]).current_dir(&self.root);
        let output = spawn(&mut cmd)?;
        Ok(output.status.success())
    }

    fn list_open(&self) -> Result<Vec<Ticket>, TrackerError> {
        let limit = LIST_LIMIT.to_string();
        let cmd = self.command(&[
            "issue", "list", "--limit", limit.as_str(), "--state", "open", "--json", LIST_FIELDS,
        ]);
        let stdout = self.run(cmd, "gh issue list")?;
        let tickets = parse_issue_list(&stdout)?;
        tracing::debug!("tracker reports {} open ticket(s)", tickets.len());
        Ok(tickets)
    }

    fn create(&self, draft: &TicketDraft) -> Result<Option<TicketNumber>, TrackerError> {
        let mut cmd = self.command(&["issue", "create", "--title", draft.title.as_str(), "--body", draft.body.as_str()]);
        for label in &draft.labels {
            cmd.arg("--label").arg(label);
        }
        for assignee in &draft.assignees {
            cmd.arg("--assignee").arg(assignee);
        }
        let stdout = self.run(cmd, "gh issue create")?;
        Ok(parse_created_number(&String::from_utf8_lossy(&stdout)))
    }

    fn update(&self, number: TicketNumber, draft: &TicketDraft) -> Result<(), TrackerError> {
        let n = number.to_string();
        let mut cmd = self.command(&["issue", "edit", n.as_str(), "--title", draft.title.as_str(), "--body", draft.body.as_str()]);
        for label in &draft.labels {
            cmd.arg("--add-label").arg(label);
        }
        for assignee in &draft.assignees {
            cmd.arg("--add-assignee").arg(assignee);
        }
        self.run(cmd, &format!("gh issue edit {n}"))?;
        Ok(())
    }

    fn close(&self, number: TicketNumber, comment: Option<&str>) -> Result<(), TrackerError> {
        let n = number.to_string();
        let mut cmd = self.command(&["issue", "close", n.as_str()]);
        if let Some(comment) = comment {
            cmd.arg("--comment").arg(comment);
        }
        self.run(cmd, &format!("gh issue close {n}"))?;
        Ok(())
    }
}

fn spawn(cmd: &mut Command) -> Result<Output, TrackerError> {
    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| TrackerError::Spawn {
            program: cmd.get_program().to_string_lossy().into_owned(),
            source,
        })
}

// ---------------------------------------------------------------------------
// Response decoding
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhIssue {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    labels: Vec<GhLabel>,
    #[serde(default)]
    assignees: Vec<GhUser>,
    #[serde(default)]
    state: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct GhLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GhUser {
    login: String,
}

impl From<GhIssue> for Ticket {
    fn from(issue: GhIssue) -> Self {
        Ticket {
            number: TicketNumber(issue.number),
            title: issue.title,
            body: issue.body.unwrap_or_default(),
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
            assignees: issue.assignees.into_iter().map(|a| a.login).collect(),
            state: issue.state,
            created_at: issue.created_at,
            updated_at: issue.updated_at,
        }
    }
}

/// Decode `gh issue list --json ...` output.
pub fn parse_issue_list(json: &[u8]) -> Result<Vec<Ticket>, TrackerError> {
    let issues: Vec<GhIssue> = serde_json::from_slice(json)?;
    Ok(issues.into_iter().map(Ticket::from).collect())
}

/// Ticket number from the URL `gh issue create` prints, e.g.
/// `https://github.com/acme/widgets/issues/42`.
pub fn parse_created_number(stdout: &str) -> Option<TicketNumber> {
    stdout.lines().rev().find_map(|line| {
        let (_, tail) = line.trim().rsplit_once("/issues/")?;
        let digits: String = tail.chars().take_while(char::is_ascii_digit).collect();
        digits.parse().ok()
    })
}

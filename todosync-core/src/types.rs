//! Domain types shared by every todosync crate.
//!
//! All path fields use `PathBuf` and are relative to the repository root.
//! Nothing here performs I/O.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of hex characters kept from a marker fingerprint.
pub const IDENTITY_LEN: usize = 12;

/// Title used when a document carries no `title` metadata.
pub const UNTITLED: &str = "Untitled";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Content-derived fingerprint of a code marker: 12 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(pub(crate) String);

impl Identity {
    /// Parse a fingerprint token. Returns `None` unless `s` is exactly
    /// [`IDENTITY_LEN`] lowercase hex characters.
    pub fn parse(s: &str) -> Option<Self> {
        let valid = s.len() == IDENTITY_LEN
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then(|| Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for Identity {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Identity::parse(&s).ok_or_else(|| format!("invalid identity '{s}'"))
    }
}

impl From<Identity> for String {
    fn from(id: Identity) -> Self {
        id.0
    }
}

/// A ticket number assigned by the external tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketNumber(pub u64);

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for TicketNumber {
    fn from(n: u64) -> Self {
        Self(n)
    }
}

impl FromStr for TicketNumber {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

// ---------------------------------------------------------------------------
// Code markers
// ---------------------------------------------------------------------------

/// A TODO comment found in the source tree. Recomputed on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeMarker {
    pub identity: Identity,
    /// Repository-relative path with `/` separators.
    pub source_file: PathBuf,
    /// 1-based line number.
    pub line: usize,
    /// Trimmed marker text.
    pub text: String,
}

impl CodeMarker {
    /// Build a marker, deriving its identity from `(source_file, line, text)`.
    pub fn new(source_file: impl Into<PathBuf>, line: usize, text: &str) -> Self {
        let source_file = source_file.into();
        let text = text.trim().to_string();
        let identity = crate::identity::fingerprint(&source_file, line, &text);
        Self {
            identity,
            source_file,
            line,
            text,
        }
    }

    /// Lowercased file extension without the dot, or `""`.
    pub fn extension(&self) -> String {
        self.source_file
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Work documents
// ---------------------------------------------------------------------------

/// The metadata block at the top of a work document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub assignees: Vec<String>,
    /// Keys this tool does not interpret; preserved on rewrite.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// A markdown work-item document under the documents directory.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkDocument {
    /// Repository-relative path of the file.
    pub path: PathBuf,
    pub filename: String,
    pub ticket_number: Option<TicketNumber>,
    pub metadata: Metadata,
    /// Body with the metadata block stripped.
    pub body: String,
    /// Present only when the filename encodes a fingerprint.
    pub identity: Option<Identity>,
    /// File modification time at snapshot; `None` for documents not yet on disk.
    pub last_modified: Option<DateTime<Utc>>,
}

impl WorkDocument {
    /// Whether this document was generated from a code marker.
    pub fn is_code_origin(&self) -> bool {
        self.identity.is_some()
    }

    /// Title to push to the tracker.
    pub fn title(&self) -> &str {
        self.metadata
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(UNTITLED)
    }

    /// Tracker fields derived from this document.
    pub fn to_draft(&self) -> TicketDraft {
        TicketDraft {
            title: self.title().to_string(),
            body: self.body.clone(),
            labels: self.metadata.labels.clone(),
            assignees: self.metadata.assignees.clone(),
        }
    }

    /// Path of this document after a rename to `filename`, in the same directory.
    pub fn sibling(&self, filename: &str) -> PathBuf {
        self.path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(filename)
    }
}

// ---------------------------------------------------------------------------
// Tickets
// ---------------------------------------------------------------------------

/// A ticket as reported by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub number: TicketNumber,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub assignees: Vec<String>,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Whether pushing `draft` would change nothing. Labels and assignees are
    /// only ever added, so the draft's need only be a subset of the ticket's.
    pub fn reflects(&self, draft: &TicketDraft) -> bool {
        let labels: BTreeSet<&str> = self.labels.iter().map(String::as_str).collect();
        let assignees: BTreeSet<&str> = self.assignees.iter().map(String::as_str).collect();
        self.title.trim() == draft.title.trim()
            && normalize_body(&self.body) == normalize_body(&draft.body)
            && draft.labels.iter().all(|l| labels.contains(l.as_str()))
            && draft.assignees.iter().all(|a| assignees.contains(a.as_str()))
    }
}

fn normalize_body(body: &str) -> String {
    body.replace("\r\n", "\n").trim().to_string()
}

/// Fields sent to the tracker on create / update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TicketDraft {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
}

// ---------------------------------------------------------------------------
// Run context
// ---------------------------------------------------------------------------

/// What started this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    #[default]
    Push,
    Manual,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Push => write!(f, "push"),
            Trigger::Manual => write!(f, "manual"),
        }
    }
}

impl FromStr for Trigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "push" => Ok(Trigger::Push),
            "manual" | "workflow_dispatch" => Ok(Trigger::Manual),
            other => Err(format!(
                "unknown trigger '{other}'; expected: push, manual"
            )),
        }
    }
}

/// Externally supplied run context.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunContext {
    pub trigger: Trigger,
    /// Files changed by the triggering push. `None` when unknown.
    pub changed_files: Option<BTreeSet<PathBuf>>,
}

impl RunContext {
    pub fn manual() -> Self {
        Self {
            trigger: Trigger::Manual,
            changed_files: None,
        }
    }

    pub fn push(changed_files: Option<BTreeSet<PathBuf>>) -> Self {
        Self {
            trigger: Trigger::Push,
            changed_files,
        }
    }

    /// Parse a newline-separated changed-files list. Blank input means absent.
    pub fn parse_changed_files(raw: &str) -> Option<BTreeSet<PathBuf>> {
        let files: BTreeSet<PathBuf> = raw
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(PathBuf::from)
            .collect();
        (!files.is_empty()).then_some(files)
    }

    /// Whether a document at `path` should be pushed to its ticket when code,
    /// document and ticket all exist.
    ///
    /// Manual runs and pushes without a changed-files list sync everything.
    pub fn wants_sync(&self, path: &Path) -> bool {
        match (self.trigger, &self.changed_files) {
            (Trigger::Manual, _) => true,
            (Trigger::Push, None) => true,
            (Trigger::Push, Some(files)) => files.contains(path),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

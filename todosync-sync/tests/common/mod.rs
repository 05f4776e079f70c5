//! In-memory collaborators for pipeline tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use todosync_core::{Ticket, TicketDraft, TicketNumber};
use todosync_sync::{Tracker, TrackerError, Vcs, VcsError};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(TicketDraft),
    Update(TicketNumber, TicketDraft),
    Close(TicketNumber, Option<String>),
}

/// Tracker holding open tickets in memory.
pub struct FakeTracker {
    pub authenticated: bool,
    /// When false, `create` succeeds but reports no number.
    pub report_numbers: bool,
    pub fail_closes: bool,
    tickets: RefCell<BTreeMap<TicketNumber, Ticket>>,
    next: Cell<u64>,
    calls: RefCell<Vec<Call>>,
}

impl FakeTracker {
    pub fn new() -> Self {
        Self {
            authenticated: true,
            report_numbers: true,
            fail_closes: false,
            tickets: RefCell::new(BTreeMap::new()),
            next: Cell::new(1),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_ticket(self, number: u64, updated_at: DateTime<Utc>) -> Self {
        let ticket = Ticket {
            number: TicketNumber(number),
            title: format!("ticket {number}"),
            body: String::new(),
            labels: vec![],
            assignees: vec![],
            state: "OPEN".to_string(),
            created_at: updated_at,
            updated_at,
        };
        self.tickets.borrow_mut().insert(ticket.number, ticket);
        if self.next.get() <= number {
            self.next.set(number + 1);
        }
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn open_numbers(&self) -> Vec<u64> {
        self.tickets.borrow().keys().map(|n| n.0).collect()
    }

    pub fn ticket(&self, number: u64) -> Option<Ticket> {
        self.tickets.borrow().get(&TicketNumber(number)).cloned()
    }
}

impl Tracker for FakeTracker {
    fn check_authenticated(&self) -> Result<bool, TrackerError> {
        Ok(self.authenticated)
    }

    fn list_open(&self) -> Result<Vec<Ticket>, TrackerError> {
        Ok(self.tickets.borrow().values().cloned().collect())
    }

    fn create(&self, draft: &TicketDraft) -> Result<Option<TicketNumber>, TrackerError> {
        self.calls.borrow_mut().push(Call::Create(draft.clone()));
        let number = TicketNumber(self.next.get());
        self.next.set(number.0 + 1);
        let now = Utc::now();
        self.tickets.borrow_mut().insert(
            number,
            Ticket {
                number,
                title: draft.title.clone(),
                body: draft.body.clone(),
                labels: draft.labels.clone(),
                assignees: draft.assignees.clone(),
                state: "OPEN".to_string(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(self.report_numbers.then_some(number))
    }

    fn update(&self, number: TicketNumber, draft: &TicketDraft) -> Result<(), TrackerError> {
        self.calls.borrow_mut().push(Call::Update(number, draft.clone()));
        if let Some(ticket) = self.tickets.borrow_mut().get_mut(&number) {
            ticket.title = draft.title.clone();
            ticket.body = draft.body.clone();
            for label in &draft.labels {
                if !ticket.labels.contains(label) {
                    ticket.labels.push(label.clone());
                }
            }
            for assignee in &draft.assignees {
                if !ticket.assignees.contains(assignee) {
                    ticket.assignees.push(assignee.clone());
                }
            }
            ticket.updated_at = Utc::now();
        }
        Ok(())
    }

    fn close(&self, number: TicketNumber, comment: Option<&str>) -> Result<(), TrackerError> {
        if self.fail_closes {
            return Err(TrackerError::Command {
                command: format!("gh issue close {number}"),
                stderr: "HTTP 502".to_string(),
            });
        }
        self.calls
            .borrow_mut()
            .push(Call::Close(number, comment.map(str::to_string)));
        self.tickets.borrow_mut().remove(&number);
        Ok(())
    }
}

/// VCS that performs renames on disk and records every operation.
pub struct RecordingVcs {
    root: PathBuf,
    staged: Cell<bool>,
    ops: RefCell<Vec<String>>,
}

impl RecordingVcs {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            staged: Cell::new(false),
            ops: RefCell::new(Vec::new()),
        }
    }

    pub fn ops(&self) -> Vec<String> {
        self.ops.borrow().clone()
    }

    pub fn is_staged(&self) -> bool {
        self.staged.get()
    }
}

impl Vcs for RecordingVcs {
    fn stage(&self, path: &Path) -> Result<(), VcsError> {
        self.ops.borrow_mut().push(format!("add {}", path.display()));
        self.staged.set(true);
        Ok(())
    }

    fn move_path(&self, from: &Path, to: &Path) -> Result<(), VcsError> {
        fs::rename(self.root.join(from), self.root.join(to)).map_err(VcsError::Spawn)?;
        self.ops
            .borrow_mut()
            .push(format!("mv {} {}", from.display(), to.display()));
        self.staged.set(true);
        Ok(())
    }

    fn commit(&self, message: &str, skip_automation: bool) -> Result<(), VcsError> {
        self.ops.borrow_mut().push(format!(
            "commit {}",
            todosync_sync::vcs::commit_message(message, skip_automation)
        ));
        self.staged.set(false);
        Ok(())
    }

    fn push(&self) -> Result<(), VcsError> {
        self.ops.borrow_mut().push("push".to_string());
        Ok(())
    }

    fn has_staged_changes(&self) -> Result<bool, VcsError> {
        Ok(self.staged.get())
    }
}

/// Write `content` to `<root>/<relative>`, creating parents.
pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Sorted filenames in the documents directory.
pub fn doc_names(root: &Path, docs_dir: &str) -> Vec<String> {
    let dir = root.join(docs_dir);
    let Ok(entries) = fs::read_dir(&dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

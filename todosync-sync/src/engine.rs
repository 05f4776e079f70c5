//! Reconciliation engine.
//!
//! Two halves:
//!
//! - [`plan`] is pure. It takes the three snapshots plus the run context,
//!   classifies every work item and lists the [`Step`]s that converge them,
//!   together with every policy warning.
//! - [`apply`] executes a plan against the document store, the tracker and
//!   the version-control index, strictly in order, stopping at the first
//!   failure.
//!
//! # Dispatch order
//!
//! 1. documents for code-only identities are generated first, so the
//!    identity phase sees them;
//! 2. every identity (markers ∪ code-origin documents);
//! 3. tracker-origin documents (no identity), keyed by ticket number;
//! 4. open tickets no document references.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use todosync_core::{
    classify, filename, Action, CodeMarker, Identity, Presence, ReconcileState, RunContext, Ticket,
    TicketNumber, Trigger, WorkDocument,
};
use todosync_docs::{store, DocumentGenerator};

use crate::error::SyncError;
use crate::tracker::Tracker;
use crate::vcs::Vcs;

/// Comment left on tickets closed because nothing references them any more.
pub const CLOSE_COMMENT: &str = "Cancelled - no matching documentation found";

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Everything the engine reads, captured once at the start of a run.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub markers: Vec<CodeMarker>,
    pub documents: Vec<WorkDocument>,
    /// Open tickets only.
    pub tickets: Vec<Ticket>,
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// How a work item is keyed in reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ItemKey {
    /// A code-origin item.
    Identity(Identity),
    /// A tracker-origin document or an orphaned ticket.
    Ticket(TicketNumber),
    /// A tracker-origin document that has no ticket number yet.
    Document(String),
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKey::Identity(id) => write!(f, "{id}"),
            ItemKey::Ticket(n) => write!(f, "#{n}"),
            ItemKey::Document(name) => f.write_str(name),
        }
    }
}

/// One classified work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanItem {
    pub key: ItemKey,
    pub state: ReconcileState,
    pub action: Action,
    /// Filename of the document involved, if any.
    pub document: Option<String>,
    /// Open ticket involved, if any.
    pub ticket: Option<TicketNumber>,
    /// Whether the action produced a step. `false` for `Nothing`, for syncs
    /// the run context gates out and for tickets already in step.
    pub scheduled: bool,
    /// The ticket already carries the document's fields; no sync needed.
    pub in_step: bool,
}

/// One mutation, in execution order.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Write a generated document and stage it.
    CreateDocument { document: WorkDocument },
    /// Open a ticket from the document, then rename the document to embed
    /// the new number.
    CreateTicket { document: WorkDocument },
    /// Push document fields to an existing ticket.
    SyncTicket {
        document: WorkDocument,
        number: TicketNumber,
    },
    CloseTicket { number: TicketNumber },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::CreateDocument { document } => write!(f, "create document {}", document.path.display()),
            Step::CreateTicket { document } => write!(f, "create ticket for {}", document.filename),
            Step::SyncTicket { document, number } => {
                write!(f, "sync {} -> #{number}", document.filename)
            }
            Step::CloseTicket { number } => write!(f, "close #{number}"),
        }
    }
}

/// Output of [`plan`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct Plan {
    #[serde(skip)]
    pub steps: Vec<Step>,
    pub items: Vec<PlanItem>,
    pub warnings: Vec<String>,
}

impl Plan {
    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tally
// ---------------------------------------------------------------------------

/// Counts reported at the end of a run. Owned by the caller so it survives a
/// fatal error part-way through [`apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub documents_created: usize,
    /// Tickets created.
    pub created: usize,
    pub updated: usize,
    pub closed: usize,
    pub renamed: usize,
    pub warnings: Vec<String>,
}

impl Tally {
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.warnings.push(message);
    }

    /// Total mutations made.
    pub fn mutations(&self) -> usize {
        self.documents_created + self.created + self.updated + self.closed + self.renamed
    }
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Classify every work item in `snapshot` and list the steps that converge
/// them. Generated documents are placed under `docs_dir`.
///
/// No I/O: document modification times come from the snapshot.
pub fn plan(snapshot: &Snapshot, ctx: &RunContext, docs_dir: &Path) -> Result<Plan, SyncError> {
    let generator = DocumentGenerator::new()?;
    let mut planner = Planner::new(ctx);

    if ctx.trigger == Trigger::Push && ctx.changed_files.is_none() {
        tracing::info!("push without a changed-files list: syncing every linked document");
    }

    let open: BTreeMap<TicketNumber, &Ticket> =
        snapshot.tickets.iter().map(|t| (t.number, t)).collect();

    let mut code: BTreeMap<&Identity, &CodeMarker> = BTreeMap::new();
    for marker in &snapshot.markers {
        code.entry(&marker.identity).or_insert(marker);
    }

    let mut documents: Vec<&WorkDocument> = snapshot.documents.iter().collect();
    documents.sort_by(|a, b| a.filename.cmp(&b.filename));
    let referenced: BTreeSet<TicketNumber> =
        documents.iter().filter_map(|d| d.ticket_number).collect();

    // First document per identity and per number wins.
    let mut by_identity: BTreeMap<&Identity, &WorkDocument> = BTreeMap::new();
    let mut by_number: BTreeMap<TicketNumber, &str> = BTreeMap::new();
    let mut task_docs: Vec<&WorkDocument> = Vec::new();
    for doc in documents {
        if let Some(id) = &doc.identity {
            if let Some(first) = by_identity.get(id) {
                planner.warn(format!(
                    "duplicate document for identity {id}: ignoring {} in favour of {}",
                    doc.filename, first.filename
                ));
                continue;
            }
        }
        if let Some(number) = doc.ticket_number {
            if let Some(first) = by_number.get(&number) {
                planner.warn(format!(
                    "duplicate document for ticket #{number}: ignoring {} in favour of {first}",
                    doc.filename
                ));
                continue;
            }
            by_number.insert(number, &doc.filename);
        }
        match &doc.identity {
            Some(id) => {
                by_identity.insert(id, doc);
            }
            None => task_docs.push(doc),
        }
    }

    // Phase 1: documents for code-only identities.
    let mut generated: BTreeMap<&Identity, WorkDocument> = BTreeMap::new();
    for (id, marker) in &code {
        if by_identity.contains_key(id) {
            continue;
        }
        let document = generator.generate(marker, docs_dir)?;
        planner.steps.push(Step::CreateDocument {
            document: document.clone(),
        });
        generated.insert(*id, document);
    }

    // Phase 2: identities.
    let identities: BTreeSet<&Identity> = code.keys().chain(by_identity.keys()).copied().collect();
    for id in identities {
        let existing = by_identity.get(id).copied();
        let ticket = existing
            .and_then(|d| d.ticket_number)
            .and_then(|n| open.get(&n).copied());
        let presence = Presence::new(code.contains_key(id), existing.is_some(), ticket.is_some());
        let document = existing.or_else(|| generated.get(id));
        planner.resolve(ItemKey::Identity(id.clone()), presence, document, ticket);
    }

    // Phase 3: tracker-origin documents.
    for doc in task_docs {
        let ticket = doc.ticket_number.and_then(|n| open.get(&n).copied());
        let key = match doc.ticket_number {
            Some(n) => ItemKey::Ticket(n),
            None => ItemKey::Document(doc.filename.clone()),
        };
        planner.resolve(key, Presence::new(false, true, ticket.is_some()), Some(doc), ticket);
    }

    // Phase 4: orphaned tickets.
    for (number, ticket) in &open {
        if referenced.contains(number) {
            continue;
        }
        planner.resolve(
            ItemKey::Ticket(*number),
            Presence::new(false, false, true),
            None,
            Some(*ticket),
        );
    }

    Ok(planner.finish())
}

struct Planner<'c> {
    ctx: &'c RunContext,
    steps: Vec<Step>,
    items: Vec<PlanItem>,
    warnings: Vec<String>,
}

impl<'c> Planner<'c> {
    fn new(ctx: &'c RunContext) -> Self {
        Self {
            ctx,
            steps: Vec::new(),
            items: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        self.warnings.push(message);
    }

    fn resolve(
        &mut self,
        key: ItemKey,
        presence: Presence,
        document: Option<&WorkDocument>,
        ticket: Option<&Ticket>,
    ) {
        let state = ReconcileState::from_presence(presence);
        let action = classify(state);
        if state.is_anomaly() {
            self.warn(format!(
                "{key}: code and ticket exist without a document; leaving it alone"
            ));
        }

        let mut in_step = false;
        let scheduled = match (action, document, ticket) {
            (Action::CreateDocumentAndTicket | Action::CreateTicket, Some(doc), _) => {
                if let Some(stale) = doc.ticket_number {
                    self.warn(format!(
                        "ticket #{stale} referenced by {} is no longer open; creating a replacement",
                        doc.filename
                    ));
                }
                self.steps.push(Step::CreateTicket {
                    document: doc.clone(),
                });
                true
            }
            (Action::SyncOnChange, Some(doc), Some(ticket)) => {
                if self.ctx.wants_sync(&doc.path) {
                    let scheduled = self.sync(doc, ticket);
                    in_step = !scheduled;
                    scheduled
                } else {
                    tracing::debug!("{} unchanged by this push; not syncing", doc.path.display());
                    false
                }
            }
            (Action::Sync, Some(doc), Some(ticket)) => {
                let scheduled = self.sync(doc, ticket);
                in_step = !scheduled;
                scheduled
            }
            (Action::CloseTicket, _, Some(ticket)) => {
                self.steps.push(Step::CloseTicket {
                    number: ticket.number,
                });
                true
            }
            _ => false,
        };

        self.items.push(PlanItem {
            key,
            state,
            action,
            document: document.map(|d| d.filename.clone()),
            ticket: ticket.map(|t| t.number),
            scheduled,
            in_step,
        });
    }

    /// Schedule a sync unless the ticket already carries the document's
    /// fields. Returns whether a step was added.
    fn sync(&mut self, doc: &WorkDocument, ticket: &Ticket) -> bool {
        if ticket.reflects(&doc.to_draft()) {
            tracing::debug!("#{} already matches {}", ticket.number, doc.filename);
            return false;
        }
        if let Some(warning) = recency_conflict(doc, ticket) {
            self.warn(warning);
        }
        self.steps.push(Step::SyncTicket {
            document: doc.clone(),
            number: ticket.number,
        });
        true
    }

    fn finish(self) -> Plan {
        Plan {
            steps: self.steps,
            items: self.items,
            warnings: self.warnings,
        }
    }
}

/// Warning text when the ticket was edited after the document was last
/// written. The document still wins.
pub fn recency_conflict(doc: &WorkDocument, ticket: &Ticket) -> Option<String> {
    let modified = doc.last_modified?;
    (ticket.updated_at > modified).then(|| {
        format!(
            "ticket #{} was updated more recently than {}; syncing the document to the ticket anyway",
            ticket.number, doc.filename
        )
    })
}

// ---------------------------------------------------------------------------
// Applying
// ---------------------------------------------------------------------------

/// Execute `plan` against the repository at `root`.
///
/// Steps run in order; the first failure aborts and is returned, leaving the
/// mutations made so far staged and counted in `tally`. Returns the paths
/// staged, in the order they were staged.
pub fn apply(
    plan: &Plan,
    root: &Path,
    tracker: &dyn Tracker,
    vcs: &dyn Vcs,
    tally: &mut Tally,
) -> Result<Vec<PathBuf>, SyncError> {
    let mut staged = Vec::new();

    for step in &plan.steps {
        match step {
            Step::CreateDocument { document } => {
                store::write_document(root, document)?;
                vcs.stage(&document.path)?;
                tally.documents_created += 1;
                staged.push(document.path.clone());
                tracing::info!("created document {}", document.path.display());
            }
            Step::CreateTicket { document } => {
                let Some(number) = tracker.create(&document.to_draft())? else {
                    tally.warn(format!(
                        "tracker returned no number for {}; document left unlinked",
                        document.filename
                    ));
                    continue;
                };
                tally.created += 1;
                tracing::info!("created ticket #{number} for {}", document.filename);

                let to = document.sibling(&filename::with_number(&document.filename, number));
                vcs.move_path(&document.path, &to)?;
                tally.renamed += 1;
                tracing::info!("renamed {} -> {}", document.path.display(), to.display());
                staged.push(to);
            }
            Step::SyncTicket { document, number } => {
                tracker.update(*number, &document.to_draft())?;
                tally.updated += 1;
                tracing::info!("synced {} -> #{number}", document.filename);
            }
            Step::CloseTicket { number } => {
                tracker.close(*number, Some(CLOSE_COMMENT))?;
                tally.closed += 1;
                tracing::info!("closed orphaned ticket #{number}");
            }
        }
    }
    Ok(staged)
}

//! Three-way state classification.
//!
//! Every work item is keyed by which of the three systems currently hold it.
//! The eight combinations are an enum so that adding or changing a branch is
//! checked by the compiler rather than falling through to a default.
//!
//! | code | doc | ticket | state           | action                    |
//! |------|-----|--------|-----------------|---------------------------|
//! | Y    | N   | N      | `CodeOnly`      | `CreateDocumentAndTicket` |
//! | Y    | Y   | N      | `CodeAndDoc`    | `CreateTicket`            |
//! | Y    | Y   | Y      | `Everywhere`    | `SyncOnChange`            |
//! | N    | Y   | Y      | `DocAndTicket`  | `Sync`                    |
//! | N    | Y   | N      | `DocOnly`       | `CreateTicket`            |
//! | N    | N   | Y      | `TicketOnly`    | `CloseTicket`             |
//! | N    | N   | N      | `Absent`        | `Nothing`                 |
//! | Y    | N   | Y      | `CodeAndTicket` | `Nothing` (anomaly)       |

use std::fmt;

use serde::Serialize;

/// Which systems hold a work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Presence {
    pub code: bool,
    pub doc: bool,
    pub ticket: bool,
}

impl Presence {
    pub const fn new(code: bool, doc: bool, ticket: bool) -> Self {
        Self { code, doc, ticket }
    }

    /// Compact `C D T` form with `-` for absent systems.
    pub fn flags(&self) -> String {
        let flag = |on: bool, c: char| if on { c } else { '-' };
        [flag(self.code, 'C'), flag(self.doc, 'D'), flag(self.ticket, 'T')]
            .iter()
            .collect()
    }
}

/// One of the eight presence combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileState {
    CodeOnly,
    CodeAndDoc,
    Everywhere,
    DocAndTicket,
    DocOnly,
    TicketOnly,
    Absent,
    /// Code and ticket without a document. Never produced by the engine's own
    /// bookkeeping; reported, not repaired.
    CodeAndTicket,
}

impl ReconcileState {
    pub fn all() -> &'static [ReconcileState] {
        &[
            ReconcileState::CodeOnly,
            ReconcileState::CodeAndDoc,
            ReconcileState::Everywhere,
            ReconcileState::DocAndTicket,
            ReconcileState::DocOnly,
            ReconcileState::TicketOnly,
            ReconcileState::Absent,
            ReconcileState::CodeAndTicket,
        ]
    }

    pub const fn from_presence(p: Presence) -> Self {
        match (p.code, p.doc, p.ticket) {
            (true, false, false) => ReconcileState::CodeOnly,
            (true, true, false) => ReconcileState::CodeAndDoc,
            (true, true, true) => ReconcileState::Everywhere,
            (false, true, true) => ReconcileState::DocAndTicket,
            (false, true, false) => ReconcileState::DocOnly,
            (false, false, true) => ReconcileState::TicketOnly,
            (false, false, false) => ReconcileState::Absent,
            (true, false, true) => ReconcileState::CodeAndTicket,
        }
    }

    pub const fn presence(self) -> Presence {
        match self {
            ReconcileState::CodeOnly => Presence::new(true, false, false),
            ReconcileState::CodeAndDoc => Presence::new(true, true, false),
            ReconcileState::Everywhere => Presence::new(true, true, true),
            ReconcileState::DocAndTicket => Presence::new(false, true, true),
            ReconcileState::DocOnly => Presence::new(false, true, false),
            ReconcileState::TicketOnly => Presence::new(false, false, true),
            ReconcileState::Absent => Presence::new(false, false, false),
            ReconcileState::CodeAndTicket => Presence::new(true, false, true),
        }
    }

    /// Whether this combination is inconsistent and should be reported.
    pub const fn is_anomaly(self) -> bool {
        matches!(self, ReconcileState::CodeAndTicket)
    }
}

impl fmt::Display for ReconcileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReconcileState::CodeOnly => "code-only",
            ReconcileState::CodeAndDoc => "code+doc",
            ReconcileState::Everywhere => "code+doc+ticket",
            ReconcileState::DocAndTicket => "doc+ticket",
            ReconcileState::DocOnly => "doc-only",
            ReconcileState::TicketOnly => "ticket-only",
            ReconcileState::Absent => "absent",
            ReconcileState::CodeAndTicket => "code+ticket",
        };
        f.write_str(s)
    }
}

/// What the engine does for a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Generate a document from the marker, open a ticket, rename the document.
    CreateDocumentAndTicket,
    /// Open a ticket from the document and rename it to embed the number.
    CreateTicket,
    /// Push document fields to the ticket when the run says the document changed.
    SyncOnChange,
    /// Push document fields to the ticket.
    Sync,
    /// Close the ticket with the standard comment.
    CloseTicket,
    Nothing,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::CreateDocumentAndTicket => "create doc + ticket",
            Action::CreateTicket => "create ticket",
            Action::SyncOnChange => "sync if changed",
            Action::Sync => "sync",
            Action::CloseTicket => "close ticket",
            Action::Nothing => "nothing",
        };
        f.write_str(s)
    }
}

/// Map a state to its action. Pure; depends on nothing but `state`.
pub const fn classify(state: ReconcileState) -> Action {
    match state {
        ReconcileState::CodeOnly => Action::CreateDocumentAndTicket,
        ReconcileState::CodeAndDoc => Action::CreateTicket,
        ReconcileState::Everywhere => Action::SyncOnChange,
        ReconcileState::DocAndTicket => Action::Sync,
        ReconcileState::DocOnly => Action::CreateTicket,
        ReconcileState::TicketOnly => Action::CloseTicket,
        ReconcileState::Absent => Action::Nothing,
        ReconcileState::CodeAndTicket => Action::Nothing,
    }
}

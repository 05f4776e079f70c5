//! todosync core library: domain types, identity and filename codec,
//! three-way classification, and repository configuration.
//!
//! - [`types`]: markers, documents, tickets, run context
//! - [`identity`]: fingerprints and slugs
//! - [`filename`]: the document filename codec
//! - [`classify`]: presence → state → action
//! - [`config`]: `.todosync.yaml` load / save
//! - [`error`]: [`ConfigError`]

pub mod classify;
pub mod config;
pub mod error;
pub mod filename;
pub mod identity;
pub mod types;

pub use classify::{classify, Action, Presence, ReconcileState};
pub use config::Config;
pub use error::ConfigError;
pub use types::{
    CodeMarker, Identity, Metadata, RunContext, Ticket, TicketDraft, TicketNumber, Trigger,
    WorkDocument,
};

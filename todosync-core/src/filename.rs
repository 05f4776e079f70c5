//! Filename codec for work documents.
//!
//! The filename is the only place a document's identity and ticket number are
//! persisted:
//!
//! ```text
//! todo-<identity>-<slug>.md            code-origin, no ticket yet
//! <number>-todo-<identity>-<slug>.md   code-origin, linked to a ticket
//! <number>-<anything>.md               tracker-origin, linked to a ticket
//! <anything>.md                        tracker-origin, no ticket yet
//! ```

use crate::types::{Identity, TicketNumber, IDENTITY_LEN};

/// Extension every work document carries.
pub const DOC_EXTENSION: &str = "md";

const TODO_PREFIX: &str = "todo-";

/// What a filename says about its document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedName {
    pub number: Option<TicketNumber>,
    pub identity: Option<Identity>,
}

/// Build the filename of a code-origin document.
pub fn encode(identity: &Identity, slug: &str, number: Option<TicketNumber>) -> String {
    let base = if slug.is_empty() {
        format!("{TODO_PREFIX}{identity}.{DOC_EXTENSION}")
    } else {
        format!("{TODO_PREFIX}{identity}-{slug}.{DOC_EXTENSION}")
    };
    match number {
        Some(n) => with_number(&base, n),
        None => base,
    }
}

/// Read the ticket number and identity a filename encodes.
pub fn decode(filename: &str) -> DecodedName {
    DecodedName {
        number: leading_number(filename).map(|(n, _)| n),
        identity: embedded_identity(filename),
    }
}

/// Prefix `filename` with `number`.
///
/// A code-origin name that already carries a number has that number
/// replaced, since the identity token keeps the rest of the name intact.
/// Any other name is prefixed as-is: `2024-roadmap.md` becomes
/// `17-2024-roadmap.md`.
pub fn with_number(filename: &str, number: TicketNumber) -> String {
    let rest = match leading_number(filename) {
        Some((_, rest)) if starts_with_identity(rest) => rest,
        _ => filename,
    };
    format!("{number}-{rest}")
}

/// `^(\d+)-`: the number and the remainder after the dash.
fn leading_number(filename: &str) -> Option<(TicketNumber, &str)> {
    let digits = filename.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || filename.as_bytes().get(digits) != Some(&b'-') {
        return None;
    }
    let number = filename[..digits].parse().ok()?;
    Some((number, &filename[digits + 1..]))
}

fn starts_with_identity(name: &str) -> bool {
    name.strip_prefix(TODO_PREFIX)
        .and_then(|rest| rest.get(..IDENTITY_LEN))
        .and_then(Identity::parse)
        .is_some()
}

/// First `todo-<12 hex>` token in the filename.
fn embedded_identity(filename: &str) -> Option<Identity> {
    filename.match_indices(TODO_PREFIX).find_map(|(at, _)| {
        let start = at + TODO_PREFIX.len();
        filename
            .get(start..start + IDENTITY_LEN)
            .and_then(Identity::parse)
    })
}

//! Metadata block reader / writer.
//!
//! A document starts with a YAML block fenced by `---` lines:
//!
//! ```text
//! ---
//! title: Fix race condition
//! labels: [todo, bug]
//! assignees: []
//! ---
//!
//! Body text.
//! ```
//!
//! A missing or unparsable block yields empty metadata and the whole content
//! as body.

use todosync_core::Metadata;

use crate::error::DocError;

/// The fence line around the metadata block.
pub const FENCE: &str = "---";

/// Split `content` into metadata and body. Never fails.
pub fn parse(content: &str) -> (Metadata, String) {
    let normalized = content.replace("\r\n", "\n");
    match split_block(&normalized) {
        Some((yaml, body)) => match parse_yaml(yaml) {
            Ok(metadata) => (metadata, body.trim().to_string()),
            Err(err) => {
                tracing::warn!("ignoring malformed metadata block: {err}");
                (Metadata::default(), normalized.trim().to_string())
            }
        },
        None => (Metadata::default(), normalized.trim().to_string()),
    }
}

/// Render a full document from metadata and body.
pub fn render(metadata: &Metadata, body: &str) -> Result<String, DocError> {
    let yaml = serde_yaml::to_string(metadata)?;
    Ok(format!("{FENCE}\n{yaml}{FENCE}\n\n{}\n", body.trim()))
}

fn parse_yaml(yaml: &str) -> Result<Metadata, serde_yaml::Error> {
    if yaml.trim().is_empty() {
        return Ok(Metadata::default());
    }
    serde_yaml::from_str(yaml)
}

/// `(yaml, body)` when `content` opens with a fenced block.
fn split_block(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix(FENCE)?.strip_prefix('\n')?;
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches('\n') == FENCE {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}

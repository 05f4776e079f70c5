//! Default labels for documents generated from code markers.
//!
//! Runs once, when the document is created; later syncs push whatever labels
//! the document carries.

use todosync_core::CodeMarker;

/// Label every generated document carries.
pub const TODO_LABEL: &str = "todo";

/// Extension → label. First match wins.
const EXTENSION_LABELS: &[(&[&str], &str)] = &[
    (&["py"], "python"),
    (&["js", "jsx", "ts", "tsx"], "javascript"),
    (&["rs"], "rust"),
    (&["md"], "documentation"),
    (&["yml", "yaml"], "ci-cd"),
];

/// Keyword (case-insensitive substring of the marker text) → label.
const KEYWORD_LABELS: &[(&[&str], &str)] = &[
    (&["test", "testing", "spec"], "testing"),
    (&["fix", "bug", "error"], "bug"),
    (&["doc", "document", "readme"], "documentation"),
];

/// Labels for a new document: `todo`, one per file type, one per keyword
/// group. Deduplicated, in that order.
pub fn derive_labels(marker: &CodeMarker) -> Vec<String> {
    let mut labels = vec![TODO_LABEL.to_string()];
    let mut push = |label: &str| {
        if !labels.iter().any(|l| l == label) {
            labels.push(label.to_string());
        }
    };

    let ext = marker.extension();
    if let Some((_, label)) = EXTENSION_LABELS
        .iter()
        .find(|(exts, _)| exts.contains(&ext.as_str()))
    {
        push(*label);
    }

    let text = marker.text.to_lowercase();
    for (keywords, label) in KEYWORD_LABELS {
        if keywords.iter().any(|k| text.contains(k)) {
            push(*label);
        }
    }
    labels
}

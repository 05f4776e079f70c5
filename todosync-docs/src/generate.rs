//! New-document generation for code markers.

use std::path::Path;

use tera::{Context, Tera};

use todosync_core::identity::slugify;
use todosync_core::{filename, CodeMarker, Metadata, WorkDocument};

use crate::error::DocError;
use crate::labels::derive_labels;

/// Longest title taken from a marker's text, in characters.
pub const TITLE_MAX_CHARS: usize = 100;

const TODO_TEMPLATE: &str = "todo.md.tera";

// ---------------------------------------------------------------------------
// Embedded templates: baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[(TODO_TEMPLATE, include_str!("templates/todo.md.tera"))];

/// Renders new work documents from code markers.
pub struct DocumentGenerator {
    tera: Tera,
}

impl DocumentGenerator {
    pub fn new() -> Result<Self, DocError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TPLS.iter().map(|(name, body)| (*name, *body)))?;
        Ok(Self { tera })
    }

    /// Build (but do not write) the document for `marker`, placed in `docs_dir`.
    ///
    /// The result has no ticket number and no modification time.
    pub fn generate(&self, marker: &CodeMarker, docs_dir: &Path) -> Result<WorkDocument, DocError> {
        let mut ctx = Context::new();
        ctx.insert("text", &marker.text);
        ctx.insert(
            "source_file",
            &marker.source_file.to_string_lossy().replace('\\', "/"),
        );
        ctx.insert("line", &marker.line);
        let body = self.tera.render(TODO_TEMPLATE, &ctx)?;

        let name = filename::encode(&marker.identity, &slugify(&marker.text), None);
        Ok(WorkDocument {
            path: docs_dir.join(&name),
            filename: name,
            ticket_number: None,
            metadata: Metadata {
                title: Some(marker.text.chars().take(TITLE_MAX_CHARS).collect()),
                labels: derive_labels(marker),
                assignees: Vec::new(),
                ..Metadata::default()
            },
            body: body.trim().to_string(),
            identity: Some(marker.identity.clone()),
            last_modified: None,
        })
    }
}

/// One-shot form of [`DocumentGenerator::generate`].
pub fn generate_document(marker: &CodeMarker, docs_dir: &Path) -> Result<WorkDocument, DocError> {
    DocumentGenerator::new()?.generate(marker, docs_dir)
}

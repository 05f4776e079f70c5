//! Document store: list, read and write work documents.
//!
//! Documents live directly under the documents directory (no recursion).
//! Paths on [`WorkDocument`] are relative to the repository root; every
//! function takes the root explicitly.
//!
//! ## Writes
//!
//! Same protocol as the rest of the workspace: render → `<path>.todosync.tmp`
//! → rename onto the final path.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};

use todosync_core::{filename, WorkDocument};

use crate::error::{io_err, DocError};
use crate::metadata;

/// Build a [`WorkDocument`] from its repository-relative path and content.
pub fn document_from_content(
    path: PathBuf,
    content: &str,
    last_modified: Option<DateTime<Utc>>,
) -> WorkDocument {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let decoded = filename::decode(&filename);
    let (metadata, body) = metadata::parse(content);
    WorkDocument {
        path,
        filename,
        ticket_number: decoded.number,
        metadata,
        body,
        identity: decoded.identity,
        last_modified,
    }
}

/// List every `*.md` document in `<root>/<docs_dir>`, sorted by filename.
///
/// A missing directory is an empty store. Unreadable or binary files are
/// skipped with a warning.
pub fn list_documents(root: &Path, docs_dir: &Path) -> Result<Vec<WorkDocument>, DocError> {
    let dir = root.join(docs_dir);
    if !dir.is_dir() {
        tracing::debug!("documents directory {} does not exist", dir.display());
        return Ok(Vec::new());
    }

    let mut entries: Vec<_> = std::fs::read_dir(&dir)
        .map_err(|e| io_err(&dir, e))?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .collect();
    entries.sort_by_key(|e| e.file_name());

    let mut docs = Vec::new();
    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        if Path::new(&name).extension().and_then(|e| e.to_str()) != Some(filename::DOC_EXTENSION) {
            continue;
        }
        if let Some(doc) = read_document(root, &docs_dir.join(&name)) {
            docs.push(doc);
        }
    }
    Ok(docs)
}

/// Read one document. `None` if the file cannot be read as text.
pub fn read_document(root: &Path, relative: &Path) -> Option<WorkDocument> {
    let full = root.join(relative);
    let content = match std::fs::read_to_string(&full) {
        Ok(content) => content,
        Err(err) => {
            tracing::warn!("skipping unreadable document {}: {err}", full.display());
            return None;
        }
    };
    if content.contains('\0') {
        tracing::warn!("skipping binary document {}", full.display());
        return None;
    }
    let last_modified = std::fs::metadata(&full)
        .and_then(|m| m.modified())
        .ok()
        .map(to_utc);
    Some(document_from_content(
        relative.to_path_buf(),
        &content,
        last_modified,
    ))
}

/// Write `doc` to `<root>/<doc.path>` atomically. Returns the full path.
pub fn write_document(root: &Path, doc: &WorkDocument) -> Result<PathBuf, DocError> {
    let content = metadata::render(&doc.metadata, &doc.body)?;
    let path = root.join(&doc.path);
    let tmp = PathBuf::from(format!("{}.todosync.tmp", path.display()));
    atomic_write(&path, &content, &tmp)?;
    tracing::info!("wrote: {}", doc.path.display());
    Ok(path)
}

fn atomic_write(path: &Path, content: &str, tmp: &Path) -> Result<(), DocError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;
    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

fn to_utc(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use todosync_core::{Metadata, TicketNumber};

    #[test]
    fn missing_directory_is_empty() {
        let root = TempDir::new().unwrap();
        let docs = list_documents(root.path(), Path::new(".github/issues")).unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn non_markdown_files_are_ignored() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("issues");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("notes.txt"), "x").unwrap();
        fs::write(dir.join("3-task.md"), "---\ntitle: Task\n---\nbody\n").unwrap();

        let docs = list_documents(root.path(), Path::new("issues")).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].ticket_number, Some(TicketNumber(3)));
        assert_eq!(docs[0].path, PathBuf::from("issues/3-task.md"));
        assert!(docs[0].last_modified.is_some());
    }

    #[test]
    fn write_then_read_back() {
        let root = TempDir::new().unwrap();
        let doc = document_from_content(
            PathBuf::from("issues/todo-0123456789ab-thing.md"),
            "",
            None,
        );
        let doc = WorkDocument {
            metadata: Metadata {
                title: Some("Thing".to_string()),
                ..Metadata::default()
            },
            body: "Body".to_string(),
            ..doc
        };
        let written = write_document(root.path(), &doc).unwrap();
        assert!(written.exists());
        assert!(!PathBuf::from(format!("{}.todosync.tmp", written.display())).exists());

        let back = read_document(root.path(), &doc.path).unwrap();
        assert_eq!(back.metadata, doc.metadata);
        assert_eq!(back.body, doc.body);
        assert_eq!(back.identity, doc.identity);
    }

    #[test]
    #[cfg(unix)]
    fn rename_failure_leaves_original_and_cleans_tmp() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        let readonly_dir = root.path().join("readonly");
        fs::create_dir_all(&readonly_dir).unwrap();
        let path = readonly_dir.join("file.md");
        fs::write(&path, "original").unwrap();

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o555);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        let tmp_dir = TempDir::new().unwrap();
        let tmp_path = tmp_dir.path().join("file.md.todosync.tmp");
        let result = atomic_write(&path, "new content", &tmp_path);

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        if result.is_ok() {
            // Running as root: permission bits are not enforced.
            return;
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
        assert!(!tmp_path.exists(), ".todosync.tmp should be cleaned up");
    }
}

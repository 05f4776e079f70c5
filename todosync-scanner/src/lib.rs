//! TODO marker scanning for `todosync-scanner`.
//!
//! `scan(root, excludes)` walks a source tree and returns one [`CodeMarker`]
//! per TODO comment. Recognised openers are `//`, `#`, `<!--` and `/*`; the
//! keyword match is case-insensitive and the captured text runs to the end of
//! the line or to a closing `-->` / `*/`.

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

use todosync_core::CodeMarker;

/// Directory names never descended into.
pub const SKIP_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "__pycache__",
    ".venv",
    "venv",
    "dist",
    "build",
    ".next",
    "coverage",
    "target",
];

/// Bytes inspected for a NUL when deciding whether a file is binary.
const BINARY_SNIFF_LEN: usize = 8000;

static MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?://|#|<!--|/\*)\s*TODO\b:?\s*(.+?)\s*(?:-->|\*/)?\s*$")
        .expect("marker regex is valid")
});

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from scanning. Unreadable files are skipped, not reported.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("scan root '{path}' is not a directory")]
    RootNotFound { path: PathBuf },

    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Scan every file under `root` for TODO markers.
///
/// `excludes` are repository-relative paths skipped along with [`SKIP_DIRS`].
/// Marker paths are repository-relative with `/` separators. Output order is
/// deterministic: files in sorted path order, markers in line order.
pub fn scan(root: &Path, excludes: &[PathBuf]) -> Result<Vec<CodeMarker>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::RootNotFound {
            path: root.to_path_buf(),
        });
    }

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped(entry, root, excludes));

    let mut markers = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(ScanError::Walk {
                    path: root.to_path_buf(),
                    source: err,
                })
            }
            Err(err) => {
                tracing::warn!("skipping unreadable entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = relative_path(entry.path(), root);
        markers.extend(scan_file(entry.path(), &relative));
    }

    tracing::info!("found {} TODO marker(s) under {}", markers.len(), root.display());
    Ok(markers)
}

/// Scan one file. `relative` is the path recorded on each marker.
///
/// Binary, non-UTF-8 and unreadable files yield no markers.
pub fn scan_file(path: &Path, relative: &Path) -> Vec<CodeMarker> {
    match read_text(path) {
        Some(content) => scan_text(&content, relative),
        None => Vec::new(),
    }
}

/// Scan in-memory content as if it were the file at `relative`.
pub fn scan_text(content: &str, relative: &Path) -> Vec<CodeMarker> {
    content
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let text = MARKER_RE.captures(line)?.get(1)?.as_str().trim();
            (!text.is_empty()).then(|| CodeMarker::new(relative.to_path_buf(), idx + 1, text))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn is_skipped(entry: &DirEntry, root: &Path, excludes: &[PathBuf]) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    if entry.file_type().is_dir() {
        let name = entry.file_name().to_string_lossy();
        if SKIP_DIRS.contains(&name.as_ref()) {
            return true;
        }
    }
    let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
    excludes.iter().any(|ex| relative.starts_with(ex))
}

fn relative_path(path: &Path, root: &Path) -> PathBuf {
    let rel = path.strip_prefix(root).unwrap_or(path);
    PathBuf::from(rel.to_string_lossy().replace('\\', "/"))
}

fn read_text(path: &Path) -> Option<String> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::debug!("skipping unreadable file {}: {err}", path.display());
            return None;
        }
    };
    let sniff = &bytes[..bytes.len().min(BINARY_SNIFF_LEN)];
    if sniff.contains(&0) {
        tracing::debug!("skipping binary file {}", path.display());
        return None;
    }
    match String::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(_) => {
            tracing::debug!("skipping non-UTF-8 file {}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(content: &str) -> Vec<String> {
        scan_text(content, Path::new("f.txt"))
            .into_iter()
            .map(|m| m.text)
            .collect()
    }

    #[test]
    fn closing_tokens_are_stripped() {
        assert_eq!(texts("<!-- TODO: add section -->"), vec!["add section"]);
        assert_eq!(texts("/* TODO handle overflow */"), vec!["handle overflow"]);
    }

    #[test]
    fn keyword_must_be_a_whole_word() {
        assert!(texts("# todos are tracked elsewhere").is_empty());
        assert!(texts("// TODO_LIST constant").is_empty());
    }

    #[test]
    fn bare_keyword_without_text_is_ignored() {
        assert!(texts("// TODO").is_empty());
        assert!(texts("// TODO:   ").is_empty());
    }

    #[test]
    fn line_numbers_are_one_based() {
        let markers = scan_text("fn a() {}\n// TODO: second line\n", Path::new("a.rs"));
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].line, 2);
    }

    #[test]
    fn crlf_lines_do_not_leak_carriage_returns() {
        assert_eq!(texts("# TODO: windows\r\nx\r\n"), vec!["windows"]);
    }
}

//! Marker fingerprints and slugs. Pure functions, no I/O.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::types::{Identity, IDENTITY_LEN};

/// Maximum slug length embedded in a document filename.
pub const SLUG_MAX_LEN: usize = 50;

/// Fingerprint a marker from its file, 1-based line and text.
///
/// The text is trimmed before hashing; the path is hashed with `/` separators
/// so identities match across platforms.
pub fn fingerprint(source_file: &Path, line: usize, text: &str) -> Identity {
    let file = source_file.to_string_lossy().replace('\\', "/");
    let mut hasher = Sha256::new();
    hasher.update(format!("{file}:{line}:{}", text.trim()).as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(IDENTITY_LEN);
    Identity(digest)
}

/// Turn marker text into a filename slug.
///
/// Lowercases, collapses every run of non-`[a-z0-9]` characters into one `-`,
/// trims separators from both ends and caps the result at
/// [`SLUG_MAX_LEN`] characters.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_sep = false;
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.push(c);
        } else {
            pending_sep = true;
        }
    }
    slug.truncate(SLUG_MAX_LEN);
    let trimmed = slug.trim_end_matches('-').len();
    slug.truncate(trimmed);
    slug
}

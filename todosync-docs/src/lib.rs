//! # todosync-docs
//!
//! The document store: reads and writes the per-item markdown documents kept
//! under the documents directory, and generates new documents for code
//! markers.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use todosync_docs::store;
//!
//! fn list(root: &Path) {
//!     if let Ok(docs) = store::list_documents(root, Path::new(".github/issues")) {
//!         for doc in docs {
//!             println!("{} -> {:?}", doc.filename, doc.ticket_number);
//!         }
//!     }
//! }
//! ```

pub mod error;
pub mod generate;
pub mod labels;
pub mod metadata;
pub mod store;

pub use error::DocError;
pub use generate::{generate_document, DocumentGenerator};
pub use labels::derive_labels;

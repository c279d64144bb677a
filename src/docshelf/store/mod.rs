//! # Storage Layer
//!
//! The whole document collection lives under a single key of a key-value
//! backend, serialized as one JSON array. This mirrors a browser's local
//! storage: there is no per-record file, no index and no schema version.
//!
//! ## Layers
//!
//! - [`backend::StorageBackend`]: raw string I/O per key (the "how").
//! - [`document_store::DocumentStore`]: JSON (de)serialization, record
//!   validity and the malformed-value policy (the "what").
//!
//! ## Malformed Values
//!
//! A value that does not parse as a collection is logged and treated as an
//! empty collection. The next save overwrites it.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: one `<key>.json` file per key in the data directory,
//!   written atomically.
//! - [`memory::InMemoryStore`]: for testing logic without filesystem I/O.
//!
//! ## Storage Layout
//!
//! ```text
//! <data dir>/
//! ├── documents.json      # The record collection
//! └── config.json         # Configuration
//! ```

use crate::error::Result;
use crate::model::DocumentRecord;
use std::path::PathBuf;

pub mod backend;
pub mod document_store;
pub mod fs;
pub mod fs_backend;
pub mod mem_backend;
pub mod memory;

/// Key under which the collection is stored.
pub const DOCUMENTS_KEY: &str = "documents";

/// Storage port for the document collection.
///
/// Callers always read the whole collection, modify it, and write it back.
pub trait DataStore {
    /// Load the collection in insertion order
    fn load(&self) -> Result<Vec<DocumentRecord>>;

    /// Replace the stored collection
    fn save(&mut self, documents: &[DocumentRecord]) -> Result<()>;

    /// Where the collection lives (a real path or a virtual one)
    fn location(&self) -> PathBuf;
}

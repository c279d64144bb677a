use crate::error::Result;
use std::path::PathBuf;

/// Abstract interface for raw key-value storage.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while DocumentStore handles the "what" (serialization, validity).
pub trait StorageBackend {
    /// Read the raw value stored under `key`.
    /// Returns Ok(None) if nothing has been stored yet.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// The location of `key`. For FsBackend a real path, for MemBackend a virtual one.
    fn location(&self, key: &str) -> PathBuf;
}

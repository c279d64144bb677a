use super::backend::StorageBackend;
use super::{DataStore, DOCUMENTS_KEY};
use crate::error::{DocshelfError, Result};
use crate::model::DocumentRecord;
use std::path::PathBuf;
use tracing::{debug, warn};

pub struct DocumentStore<B: StorageBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
}

impl<B: StorageBackend> DocumentStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: StorageBackend> DataStore for DocumentStore<B> {
    fn load(&self) -> Result<Vec<DocumentRecord>> {
        let Some(raw) = self.backend.read(DOCUMENTS_KEY)? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        // Parse element by element so one bad record cannot hide the rest.
        let values: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(e) => {
                warn!(
                    error = %e,
                    location = %self.backend.location(DOCUMENTS_KEY).display(),
                    "stored document collection is malformed, treating it as empty"
                );
                return Ok(Vec::new());
            }
        };

        let total = values.len();
        let documents: Vec<DocumentRecord> = values
            .into_iter()
            .enumerate()
            .filter_map(|(position, value)| {
                match serde_json::from_value::<DocumentRecord>(value) {
                    Ok(doc) if doc.is_valid() => Some(doc),
                    Ok(doc) => {
                        warn!(id = %doc.id, "skipping stored document without name or content");
                        None
                    }
                    Err(e) => {
                        warn!(position, error = %e, "skipping unreadable stored document");
                        None
                    }
                }
            })
            .collect();
        debug!(loaded = documents.len(), total, "loaded document collection");

        Ok(documents)
    }

    fn save(&mut self, documents: &[DocumentRecord]) -> Result<()> {
        let content = serde_json::to_string(documents).map_err(DocshelfError::Serialization)?;
        self.backend.write(DOCUMENTS_KEY, &content)?;
        debug!(count = documents.len(), "saved document collection");
        Ok(())
    }

    fn location(&self) -> PathBuf {
        self.backend.location(DOCUMENTS_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocumentRecord, FileCategory};
    use crate::store::memory::InMemoryStore;

    fn record(name: &str) -> DocumentRecord {
        DocumentRecord::new(
            name.to_string(),
            Some("desc".to_string()),
            "data:text/plain;base64,aGk=".to_string(),
        )
        .with_file_type(FileCategory::Txt)
        .with_size(2)
    }

    #[test]
    fn empty_store_loads_empty_collection() {
        let store = InMemoryStore::new();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_and_reload_reproduces_records() {
        let mut store = InMemoryStore::new();
        let docs = vec![record("First"), record("Second")];
        store.save(&docs).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, docs);
    }

    #[test]
    fn malformed_value_is_treated_as_empty() {
        let store = InMemoryStore::new();
        store.backend().set_raw(DOCUMENTS_KEY, "{not json");
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn invalid_records_are_skipped() {
        let store = InMemoryStore::new();
        store.backend().set_raw(
            DOCUMENTS_KEY,
            r#"[{"id":"1","name":"","image":"data:,x","date":"1/1/2024"},
                {"id":"2","name":"Kept","image":"data:,x","date":"1/1/2024"}]"#,
        );
        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Kept");
    }

    #[test]
    fn records_missing_required_fields_do_not_hide_valid_ones() {
        let store = InMemoryStore::new();
        store.backend().set_raw(
            DOCUMENTS_KEY,
            r#"[{"id":"a","name":"Keep me","image":"data:,x","date":"1/1/2024"},
                {"id":"b","name":"No image","date":"1/1/2024"},
                {"id":7,"name":"Numeric id","image":"data:,x"}]"#,
        );
        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Keep me");
    }

    #[test]
    fn adding_after_a_bad_record_keeps_valid_documents() {
        let mut store = InMemoryStore::new();
        store.backend().set_raw(
            DOCUMENTS_KEY,
            r#"[{"id":"a","name":"Keep me","image":"data:,x","date":"1/1/2024"},
                {"id":"b","name":"No image"}]"#,
        );
        let mut docs = store.load().unwrap();
        docs.push(record("New"));
        store.save(&docs).unwrap();

        let names: Vec<_> = store.load().unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["Keep me", "New"]);
    }

    #[test]
    fn non_array_value_is_treated_as_empty() {
        let store = InMemoryStore::new();
        store.backend().set_raw(DOCUMENTS_KEY, r#"{"id":"a"}"#);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn write_errors_propagate() {
        let mut store = InMemoryStore::new();
        store.backend().set_simulate_write_error(true);
        assert!(matches!(
            store.save(&[record("A")]),
            Err(DocshelfError::Store(_))
        ));
    }

    #[test]
    fn legacy_records_without_optional_fields_load() {
        let store = InMemoryStore::new();
        store.backend().set_raw(
            DOCUMENTS_KEY,
            r#"[{"id":"1","name":"Scan","image":"data:image/png;base64,AA==","date":"5/2/2024"}]"#,
        );
        let loaded = store.load().unwrap();
        assert_eq!(loaded[0].file_type, None);
        assert_eq!(loaded[0].description, None);
    }
}

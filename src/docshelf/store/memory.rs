use super::document_store::DocumentStore;
use super::mem_backend::MemBackend;

pub type InMemoryStore = DocumentStore<MemBackend>;

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        DocumentStore::with_backend(MemBackend::new())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::data_url;
    use crate::detect::TXT_MIME;
    use crate::model::{DocumentRecord, FileCategory};
    use crate::store::DataStore;

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        fn push(mut self, record: DocumentRecord) -> Self {
            let mut docs = self.store.load().unwrap();
            docs.push(record);
            self.store.save(&docs).unwrap();
            self
        }

        pub fn with_text_document(self, name: &str, text: &str) -> Self {
            let record = DocumentRecord::new(
                name.to_string(),
                None,
                data_url::encode(TXT_MIME, text.as_bytes()),
            )
            .with_file_type(FileCategory::Txt)
            .with_size(text.len() as u64);
            self.push(record)
        }

        pub fn with_document(self, name: &str, mime: &str, bytes: &[u8]) -> Self {
            let category = crate::detect::detect_parts(name, Some(mime));
            let record = DocumentRecord::new(name.to_string(), None, data_url::encode(mime, bytes))
                .with_file_type(category)
                .with_size(bytes.len() as u64);
            self.push(record)
        }

        pub fn with_documents(mut self, count: usize) -> Self {
            for i in 0..count {
                self = self.with_text_document(
                    &format!("Test Document {}", i + 1),
                    &format!("Content for document {}", i + 1),
                );
            }
            self
        }
    }
}

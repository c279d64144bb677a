use super::document_store::DocumentStore;
use super::fs_backend::FsBackend;
use std::path::{Path, PathBuf};

pub type FileStore = DocumentStore<FsBackend>;

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        DocumentStore::with_backend(FsBackend::new(root))
    }

    pub fn root(&self) -> &Path {
        self.backend.root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocumentRecord;
    use crate::store::DataStore;
    use std::fs;

    #[test]
    fn persists_across_store_instances() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().to_path_buf());
        let doc = DocumentRecord::new("Notes".into(), None, "data:,hello".into());
        store.save(std::slice::from_ref(&doc)).unwrap();

        let reopened = FileStore::new(dir.path().to_path_buf());
        assert_eq!(reopened.load().unwrap(), vec![doc]);
        assert_eq!(reopened.location(), dir.path().join("documents.json"));
    }

    #[test]
    fn corrupted_file_loads_as_empty_and_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("documents.json"), "[{]").unwrap();

        let mut store = FileStore::new(dir.path().to_path_buf());
        assert!(store.load().unwrap().is_empty());

        let doc = DocumentRecord::new("Fresh".into(), None, "data:,x".into());
        store.save(&[doc]).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }
}

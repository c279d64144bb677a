use crate::commands::{CmdMessage, CmdResult};
use crate::data_url;
use crate::detect::{detect, is_accepted_extension, mime_for_category, ACCEPTED_EXTENSIONS};
use crate::error::{DocshelfError, Result};
use crate::input::FileInput;
use crate::model::{format_size, new_id, DocumentRecord};
use crate::store::DataStore;
use tracing::{debug, info};

/// What the user filled in on the add form.
#[derive(Default)]
pub struct NewDocument<'a> {
    /// Defaults to the file name when absent or blank
    pub name: Option<String>,
    pub description: Option<String>,
    pub file: Option<&'a dyn FileInput>,
}

pub fn run<S: DataStore>(
    store: &mut S,
    request: NewDocument<'_>,
    max_upload_bytes: u64,
) -> Result<CmdResult> {
    let file = request
        .file
        .ok_or_else(|| DocshelfError::Validation("Please choose a file to upload".to_string()))?;

    let name = request
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| file.name().trim().to_string());
    if name.is_empty() {
        return Err(DocshelfError::Validation(
            "Please provide a document name".to_string(),
        ));
    }

    if !is_accepted_extension(file.name()) {
        return Err(DocshelfError::Validation(format!(
            "Unsupported file type: {} (accepted: {})",
            file.name(),
            ACCEPTED_EXTENSIONS
                .iter()
                .map(|e| format!(".{}", e))
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }

    // Checked before reading so oversized files are never loaded.
    let size = file.size()?;
    if size > max_upload_bytes {
        return Err(DocshelfError::Validation(format!(
            "File is too large ({}); the maximum is {}",
            format_size(size),
            format_size(max_upload_bytes)
        )));
    }

    let bytes = file.read()?;
    let category = detect(file);
    let mime = file
        .mime_type()
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
        .or_else(|| mime_guess::from_path(file.name()).first_raw().map(str::to_string))
        .unwrap_or_else(|| mime_for_category(category).to_string());
    debug!(file = file.name(), %category, %mime, size, "adding document");

    let description = request
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    let mut record = DocumentRecord::new(name, description, data_url::encode(&mime, &bytes))
        .with_file_type(category)
        .with_size(bytes.len() as u64);

    let mut documents = store.load()?;
    while documents.iter().any(|d| d.id == record.id) {
        record.id = new_id();
    }
    documents.push(record.clone());
    store.save(&documents)?;
    info!(id = %record.id, "document added");

    let mut result = CmdResult::default().with_affected_documents(vec![record.clone()]);
    result.add_message(CmdMessage::success(format!(
        "Document added: {} ({})",
        record.name,
        record.size.as_deref().unwrap_or("0 Bytes")
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MemoryFile;
    use crate::model::FileCategory;
    use crate::store::memory::InMemoryStore;

    const LIMIT: u64 = 10 * 1024 * 1024;

    fn add(store: &mut InMemoryStore, name: Option<&str>, file: &MemoryFile) -> Result<CmdResult> {
        run(
            store,
            NewDocument {
                name: name.map(str::to_string),
                description: None,
                file: Some(file),
            },
            LIMIT,
        )
    }

    #[test]
    fn adds_exactly_one_record() {
        let mut store = InMemoryStore::new();
        let file = MemoryFile::new("notes.txt", Some("text/plain".into()), b"hello".to_vec());

        let result = add(&mut store, Some("My Notes"), &file).unwrap();
        let docs = store.load().unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "My Notes");
        assert_eq!(docs[0].image, "data:text/plain;base64,aGVsbG8=");
        assert_eq!(docs[0].category(), Some(FileCategory::Txt));
        assert_eq!(docs[0].size.as_deref(), Some("5 Bytes"));
        assert_eq!(result.affected_documents, docs);
    }

    #[test]
    fn name_defaults_to_file_name() {
        let mut store = InMemoryStore::new();
        let file = MemoryFile::new("report.docx", None, vec![1, 2, 3]);
        add(&mut store, Some("   "), &file).unwrap();

        let doc = &store.load().unwrap()[0];
        assert_eq!(doc.name, "report.docx");
        assert_eq!(doc.category(), Some(FileCategory::Docx));
        assert!(doc
            .image
            .starts_with("data:application/vnd.openxmlformats-officedocument"));
    }

    #[test]
    fn requires_a_file() {
        let mut store = InMemoryStore::new();
        let err = run(&mut store, NewDocument::default(), LIMIT).unwrap_err();
        assert!(matches!(err, DocshelfError::Validation(_)));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn rejects_unaccepted_extensions() {
        let mut store = InMemoryStore::new();
        let file = MemoryFile::new("tool.exe", None, vec![0]);
        let err = add(&mut store, None, &file).unwrap_err();
        assert!(err.to_string().contains("Unsupported file type"));
    }

    #[test]
    fn rejects_oversized_files() {
        let mut store = InMemoryStore::new();
        let file = MemoryFile::new("big.pdf", None, vec![0; 11]);
        let err = run(
            &mut store,
            NewDocument {
                file: Some(&file),
                ..Default::default()
            },
            10,
        )
        .unwrap_err();
        assert!(err.to_string().contains("too large"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn keeps_trimmed_description() {
        let mut store = InMemoryStore::new();
        let file = MemoryFile::new("scan.png", Some("image/png".into()), vec![0x89]);
        run(
            &mut store,
            NewDocument {
                name: None,
                description: Some("  receipt  ".into()),
                file: Some(&file),
            },
            LIMIT,
        )
        .unwrap();
        assert_eq!(
            store.load().unwrap()[0].description.as_deref(),
            Some("receipt")
        );
    }

    #[test]
    fn write_failure_is_reported() {
        let mut store = InMemoryStore::new();
        store.backend().set_simulate_write_error(true);
        let file = MemoryFile::new("a.txt", None, b"x".to_vec());
        assert!(add(&mut store, None, &file).is_err());
    }
}

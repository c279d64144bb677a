use crate::commands::{Artifact, CmdMessage, CmdResult};
use crate::data_url;
use crate::error::Result;
use crate::index::DocSelector;
use crate::input::extension_of;
use crate::model::DocumentRecord;
use crate::store::DataStore;

use super::helpers::documents_by_selectors;

/// Decodes each selected record back into its original file.
pub fn run<S: DataStore>(store: &S, selectors: &[DocSelector]) -> Result<CmdResult> {
    let documents = documents_by_selectors(store, selectors)?;
    let mut result = CmdResult::default();

    for doc in documents {
        let decoded = data_url::decode(&doc.record.image)?;
        let filename = export_filename(&doc.record, decoded.mime_type.as_deref());
        result.add_message(CmdMessage::info(format!(
            "Exported {} as {}",
            doc.record.name, filename
        )));
        result = result.with_artifact(Artifact {
            filename,
            bytes: decoded.bytes,
        });
        result.affected_documents.push(doc.record);
    }
    Ok(result)
}

/// The record name, with an extension from its file type or MIME type when it has none.
fn export_filename(record: &DocumentRecord, mime_type: Option<&str>) -> String {
    if extension_of(&record.name).is_some() {
        return record.name.clone();
    }
    let extension = record
        .file_type
        .as_deref()
        .filter(|t| !matches!(*t, "image" | "unknown"))
        .or_else(|| {
            mime_type
                .and_then(mime_guess::get_mime_extensions_str)
                .and_then(|exts| exts.first().copied())
        });
    match extension {
        Some(ext) => format!("{}.{}", record.name, ext),
        None => record.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn exports_original_bytes() {
        let fixture = StoreFixture::new().with_document("scan.png", "image/png", &[0x89, 0x50]);
        let result = run(&fixture.store, &[DocSelector::Index(1)]).unwrap();
        assert_eq!(
            result.artifacts,
            vec![Artifact {
                filename: "scan.png".into(),
                bytes: vec![0x89, 0x50],
            }]
        );
    }

    #[test]
    fn adds_extension_for_bare_names() {
        let fixture = StoreFixture::new().with_text_document("Shopping list", "milk");
        let result = run(&fixture.store, &[DocSelector::Index(1)]).unwrap();
        let artifact = &result.artifacts[0];
        assert_eq!(artifact.filename, "Shopping list.txt");
        assert_eq!(artifact.bytes, b"milk");
    }
}

use crate::commands::{Artifact, CmdMessage, CmdResult};
use crate::convert::{Attempted, ConversionEngine, ConversionResult, Quality};
use crate::data_url;
use crate::detect::detect;
use crate::error::{DocshelfError, Result};
use crate::index::DocSelector;
use crate::input::MemoryFile;
use crate::model::FileCategory;
use crate::store::DataStore;
use tracing::{debug, info};

use super::helpers::document_by_selector;

/// Converts a stored document to PDF.
///
/// The file type is detected again from the decoded content's MIME type and
/// the record name, falling back to the stored type when that says unknown.
/// Images and PDFs are rejected. On success the PDF is returned as an
/// [`Artifact`]; a failed conversion is an error carrying the engine message.
pub async fn run<S: DataStore>(
    store: &S,
    engine: &ConversionEngine,
    selector: &DocSelector,
    quality: Quality,
) -> Result<CmdResult> {
    let doc = document_by_selector(store, selector)?.record;
    let decoded = data_url::decode(&doc.image)?;
    let file = MemoryFile::new(doc.name.clone(), decoded.mime_type, decoded.bytes);

    let category = match detect(&file) {
        FileCategory::Unknown => doc.category().unwrap_or(FileCategory::Unknown),
        detected => detected,
    };
    debug!(name = %doc.name, %category, %quality, "converting document");

    if !category.can_convert_to_pdf() {
        return Err(DocshelfError::Conversion(rejection(&doc.name, category)));
    }

    let mut result = CmdResult::default();
    let conversion = if category.is_word() {
        let outcome = engine.convert_word(&file, quality).await;
        if let (Attempted::Basic, Some(reason)) = (outcome.attempted, &outcome.fallback_reason) {
            result.add_message(CmdMessage::warning(format!(
                "Advanced conversion unavailable ({}); used basic conversion",
                reason
            )));
        }
        outcome.result
    } else {
        let text = String::from_utf8_lossy(file.bytes());
        engine.text_to_pdf(&text, &doc.name)
    };

    let (bytes, filename) = ConversionResult::into_output(conversion)?;
    info!(name = %doc.name, %filename, bytes = bytes.len(), "document converted");
    result.add_message(CmdMessage::success(format!(
        "Converted {} to {}",
        doc.name, filename
    )));
    Ok(result
        .with_affected_documents(vec![doc])
        .with_artifact(Artifact { filename, bytes }))
}

fn rejection(name: &str, category: FileCategory) -> String {
    match category {
        FileCategory::Image => format!("{} is an image and cannot be converted to PDF", name),
        FileCategory::Pdf => format!("{} is already a PDF", name),
        _ => format!("Unsupported file type for conversion: {}", name),
    }
}

//! File type detection.
//!
//! The MIME type wins when it is one we recognize; otherwise the lowercased
//! extension is consulted. Anything else is [`FileCategory::Unknown`].

use crate::input::{extension_of, FileInput};
use crate::model::FileCategory;

pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const DOC_MIME: &str = "application/msword";
pub const TXT_MIME: &str = "text/plain";
pub const PDF_MIME: &str = "application/pdf";

/// Extensions the add operation accepts.
pub const ACCEPTED_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "txt", "png", "jpg", "jpeg", "gif", "bmp",
];

pub fn detect(file: &dyn FileInput) -> FileCategory {
    detect_parts(file.name(), file.mime_type())
}

pub fn detect_parts(name: &str, mime_type: Option<&str>) -> FileCategory {
    if let Some(category) = mime_type.and_then(category_for_mime) {
        return category;
    }
    extension_of(name)
        .and_then(|ext| category_for_extension(&ext))
        .unwrap_or(FileCategory::Unknown)
}

fn category_for_mime(mime: &str) -> Option<FileCategory> {
    let essence = mime
        .split(';')
        .next()
        .unwrap_or(mime)
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        DOCX_MIME => Some(FileCategory::Docx),
        DOC_MIME => Some(FileCategory::Doc),
        TXT_MIME => Some(FileCategory::Txt),
        PDF_MIME => Some(FileCategory::Pdf),
        m if m.starts_with("image/") => Some(FileCategory::Image),
        _ => None,
    }
}

fn category_for_extension(ext: &str) -> Option<FileCategory> {
    match ext {
        "docx" => Some(FileCategory::Docx),
        "doc" => Some(FileCategory::Doc),
        "txt" => Some(FileCategory::Txt),
        "pdf" => Some(FileCategory::Pdf),
        "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" | "svg" => Some(FileCategory::Image),
        _ => None,
    }
}

/// MIME type to record in a data URL when the file does not report one.
pub fn mime_for_category(category: FileCategory) -> &'static str {
    match category {
        FileCategory::Docx => DOCX_MIME,
        FileCategory::Doc => DOC_MIME,
        FileCategory::Txt => TXT_MIME,
        FileCategory::Pdf => PDF_MIME,
        FileCategory::Image | FileCategory::Unknown => "application/octet-stream",
    }
}

pub fn is_accepted_extension(name: &str) -> bool {
    extension_of(name)
        .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MemoryFile;

    #[test]
    fn mime_type_takes_priority() {
        assert_eq!(
            detect_parts("report.txt", Some(DOCX_MIME)),
            FileCategory::Docx
        );
        assert_eq!(detect_parts("scan", Some("image/png")), FileCategory::Image);
        assert_eq!(
            detect_parts("x", Some("text/plain; charset=utf-8")),
            FileCategory::Txt
        );
    }

    #[test]
    fn falls_back_to_extension() {
        assert_eq!(detect_parts("Report.DOCX", None), FileCategory::Docx);
        assert_eq!(
            detect_parts("old.doc", Some("application/octet-stream")),
            FileCategory::Doc
        );
        assert_eq!(detect_parts("photo.JPEG", Some("")), FileCategory::Image);
        assert_eq!(detect_parts("paper.pdf", None), FileCategory::Pdf);
    }

    #[test]
    fn unknown_mime_and_extension_is_unknown() {
        assert_eq!(
            detect_parts("data.xyz", Some("application/x-custom")),
            FileCategory::Unknown
        );
        assert_eq!(detect_parts("noext", None), FileCategory::Unknown);
    }

    #[test]
    fn detection_is_deterministic() {
        let file = MemoryFile::new("notes.txt", Some(TXT_MIME.into()), vec![]);
        let first = detect(&file);
        for _ in 0..3 {
            assert_eq!(detect(&file), first);
        }
    }

    #[test]
    fn accepted_extensions_match_upload_list() {
        assert!(is_accepted_extension("a.PDF"));
        assert!(is_accepted_extension("b.jpeg"));
        assert!(!is_accepted_extension("c.exe"));
        assert!(!is_accepted_extension("noext"));
    }
}

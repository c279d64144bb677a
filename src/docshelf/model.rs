use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Category assigned to an uploaded file by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Docx,
    Doc,
    Txt,
    Pdf,
    Image,
    Unknown,
}

impl FileCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Docx => "docx",
            FileCategory::Doc => "doc",
            FileCategory::Txt => "txt",
            FileCategory::Pdf => "pdf",
            FileCategory::Image => "image",
            FileCategory::Unknown => "unknown",
        }
    }

    /// Word documents and plain text have a PDF conversion path.
    pub fn can_convert_to_pdf(&self) -> bool {
        matches!(
            self,
            FileCategory::Docx | FileCategory::Doc | FileCategory::Txt
        )
    }

    pub fn is_word(&self) -> bool {
        matches!(self, FileCategory::Docx | FileCategory::Doc)
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "docx" => Ok(FileCategory::Docx),
            "doc" => Ok(FileCategory::Doc),
            "txt" => Ok(FileCategory::Txt),
            "pdf" => Ok(FileCategory::Pdf),
            "image" => Ok(FileCategory::Image),
            "unknown" => Ok(FileCategory::Unknown),
            other => Err(format!("Unknown file type: {}", other)),
        }
    }
}

/// A stored document. Field names match the persisted JSON collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    // Holds the full file as a data URL whatever the file type is.
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default)]
    pub date: String,
}

impl DocumentRecord {
    pub fn new(name: String, description: Option<String>, data_url: String) -> Self {
        Self {
            id: new_id(),
            name,
            description,
            image: data_url,
            file_type: None,
            size: None,
            date: today(),
        }
    }

    pub fn with_file_type(mut self, category: FileCategory) -> Self {
        self.file_type = Some(category.as_str().to_string());
        self
    }

    pub fn with_size(mut self, bytes: u64) -> Self {
        self.size = Some(format_size(bytes));
        self
    }

    /// A record needs a name and stored content to be usable.
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && !self.image.is_empty()
    }

    pub fn category(&self) -> Option<FileCategory> {
        self.file_type.as_deref().and_then(|t| t.parse().ok())
    }
}

/// Timestamp in milliseconds followed by a short random suffix.
pub fn new_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().timestamp_millis(), &suffix[..9])
}

/// Creation date in the `M/D/YYYY` form used for display.
pub fn today() -> String {
    Local::now().format("%-m/%-d/%Y").to_string()
}

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Formats a byte count with up to two decimals, e.g. `1.5 KB`.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_sizes() {
        assert_eq!(format_size(0), "0 Bytes");
        assert_eq!(format_size(512), "512 Bytes");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(10 * 1024 * 1024), "10 MB");
        assert_eq!(format_size(1_234_567), "1.18 MB");
    }

    #[test]
    fn ids_carry_timestamp_and_suffix() {
        let id = new_id();
        let (millis, suffix) = id.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), 9);
        assert_ne!(new_id(), new_id());
    }

    #[test]
    fn record_serializes_with_camel_case_fields() {
        let record = DocumentRecord::new(
            "Report".into(),
            None,
            "data:text/plain;base64,aGk=".into(),
        )
        .with_file_type(FileCategory::Txt)
        .with_size(2);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["fileType"], "txt");
        assert_eq!(json["size"], "2 Bytes");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn record_validity_requires_name_and_content() {
        let mut record = DocumentRecord::new("A".into(), None, "data:,x".into());
        assert!(record.is_valid());
        record.name = "  ".into();
        assert!(!record.is_valid());
        record.name = "A".into();
        record.image.clear();
        assert!(!record.is_valid());
    }

    #[test]
    fn category_round_trips_through_string() {
        for cat in [
            FileCategory::Docx,
            FileCategory::Doc,
            FileCategory::Txt,
            FileCategory::Pdf,
            FileCategory::Image,
            FileCategory::Unknown,
        ] {
            assert_eq!(cat.as_str().parse::<FileCategory>().unwrap(), cat);
        }
        assert!(FileCategory::Docx.can_convert_to_pdf());
        assert!(!FileCategory::Image.can_convert_to_pdf());
        assert!(!FileCategory::Pdf.can_convert_to_pdf());
    }
}

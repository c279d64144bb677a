//! File handles accepted by the add and convert operations.
//!
//! A [`FileInput`] exposes what a browser `File` would: a name, an optional
//! MIME type and a size that is known before the content is read. The size is
//! checked against the upload limit before [`FileInput::read`] is called.

use crate::error::{DocshelfError, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub trait FileInput {
    fn name(&self) -> &str;

    fn mime_type(&self) -> Option<&str>;

    /// Size in bytes, available without reading the content.
    fn size(&self) -> Result<u64>;

    fn read(&self) -> Result<Vec<u8>>;

    /// Lowercased extension of [`FileInput::name`], without the dot.
    fn extension(&self) -> Option<String> {
        extension_of(self.name())
    }
}

pub(crate) fn extension_of(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// A file on disk. The MIME type is guessed from the extension.
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    name: String,
    mime_type: Option<String>,
}

impl LocalFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                DocshelfError::Validation(format!("Not a file: {}", path.display()))
            })?;
        let mime_type = mime_guess::from_path(&path)
            .first()
            .map(|m| m.essence_str().to_string());
        Ok(Self {
            path,
            name,
            mime_type,
        })
    }
}

impl FileInput for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    fn size(&self) -> Result<u64> {
        Ok(fs::metadata(&self.path)?.len())
    }

    fn read(&self) -> Result<Vec<u8>> {
        Ok(fs::read(&self.path)?)
    }
}

/// A file already held in memory, e.g. decoded from a stored record.
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    mime_type: Option<String>,
    bytes: Vec<u8>,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, mime_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type,
            bytes,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl FileInput for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    fn size(&self) -> Result<u64> {
        Ok(self.bytes.len() as u64)
    }

    fn read(&self) -> Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(extension_of("Report.DOCX"), Some("docx".into()));
        assert_eq!(extension_of("archive.tar.gz"), Some("gz".into()));
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of(".bashrc"), None);
        assert_eq!(extension_of("trailing."), None);
    }

    #[test]
    fn local_file_guesses_mime_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "hello").unwrap();

        let file = LocalFile::new(&path).unwrap();
        assert_eq!(file.name(), "notes.txt");
        assert_eq!(file.mime_type(), Some("text/plain"));
        assert_eq!(file.size().unwrap(), 5);
        assert_eq!(file.read().unwrap(), b"hello");
    }

    #[test]
    fn memory_file_reports_its_length() {
        let file = MemoryFile::new("a.bin", None, vec![1, 2, 3]);
        assert_eq!(file.size().unwrap(), 3);
        assert_eq!(file.extension(), Some("bin".into()));
    }
}

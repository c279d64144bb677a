use super::backend::StorageBackend;
use crate::error::{DocshelfError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(DocshelfError::Io)?;
        }
        Ok(())
    }
}

impl StorageBackend for FsBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path).map_err(DocshelfError::Io)?;
        // Invalid UTF-8 is passed on lossily; the store then sees a malformed value.
        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %path.display(), "stored value is not valid UTF-8");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        Ok(Some(content))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_dir()?;

        let path = self.key_path(key);
        let tmp_file = self.root.join(format!(".{}-{}.tmp", key, Uuid::new_v4()));
        fs::write(&tmp_file, value).map_err(DocshelfError::Io)?;
        fs::rename(&tmp_file, &path).map_err(DocshelfError::Io)?;

        Ok(())
    }

    fn location(&self, key: &str) -> PathBuf {
        self.key_path(key)
    }
}

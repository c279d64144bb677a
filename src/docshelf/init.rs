use crate::api::{DocshelfApi, DocshelfPaths};
use crate::config::ShelfConfig;
use crate::convert::ConversionEngine;
use crate::error::{DocshelfError, Result};
use crate::store::fs::FileStore;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "DOCSHELF_DATA";

pub struct DocshelfContext {
    pub api: DocshelfApi<FileStore>,
    pub config: ShelfConfig,
}

/// `--data` wins, then `DOCSHELF_DATA`, then the platform data directory.
pub fn resolve_data_dir(data_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = data_override {
        return Ok(dir);
    }
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("com", "docshelf", "docshelf")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| DocshelfError::Store("Could not determine a data directory".to_string()))
}

pub fn initialize(data_override: Option<PathBuf>) -> Result<DocshelfContext> {
    let data_dir = resolve_data_dir(data_override)?;
    debug!(data_dir = %data_dir.display(), "using data directory");

    let config = ShelfConfig::load(&data_dir).unwrap_or_else(|e| {
        warn!(error = %e, "could not read config, using defaults");
        ShelfConfig::default()
    });

    let store = FileStore::new(data_dir.clone());
    let engine = ConversionEngine::from_config(&config);
    let paths = DocshelfPaths { data_dir };
    let api = DocshelfApi::new(store, engine, config.clone(), paths);

    Ok(DocshelfContext { api, config })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_override_wins() {
        let dir = PathBuf::from("/tmp/shelf-override");
        assert_eq!(resolve_data_dir(Some(dir.clone())).unwrap(), dir);
    }

    #[test]
    fn initializes_with_defaults_in_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = initialize(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(ctx.config, ShelfConfig::default());
        assert_eq!(ctx.api.paths().data_dir, dir.path());
    }

    #[test]
    fn unreadable_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "not json").unwrap();
        let ctx = initialize(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(ctx.config, ShelfConfig::default());
    }
}

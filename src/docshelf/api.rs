//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single
//! entry point for every docshelf operation, whatever the UI.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Dispatches** to the matching command function
//! - **Normalizes inputs** (selector strings into [`DocSelector`]s, missing
//!   quality into the configured default)
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It does no printing, no formatting and no file output: converted and
//! exported files come back as [`commands::Artifact`]s.
//!
//! ## Generic Over DataStore
//!
//! `DocshelfApi<S: DataStore>` runs on files in production
//! (`DocshelfApi<FileStore>`) and in memory in tests
//! (`DocshelfApi<InMemoryStore>`).

use crate::commands;
use crate::config::ShelfConfig;
use crate::convert::{ConversionEngine, Quality};
use crate::error::{DocshelfError, Result};
use crate::index::DocSelector;
use crate::input::FileInput;
use crate::store::DataStore;

pub struct DocshelfApi<S: DataStore> {
    store: S,
    engine: ConversionEngine,
    config: ShelfConfig,
    paths: commands::DocshelfPaths,
}

impl<S: DataStore> DocshelfApi<S> {
    pub fn new(
        store: S,
        engine: ConversionEngine,
        config: ShelfConfig,
        paths: commands::DocshelfPaths,
    ) -> Self {
        Self {
            store,
            engine,
            config,
            paths,
        }
    }

    pub fn add_document(
        &mut self,
        name: Option<String>,
        description: Option<String>,
        file: Option<&dyn FileInput>,
    ) -> Result<commands::CmdResult> {
        let request = commands::add::NewDocument {
            name,
            description,
            file,
        };
        commands::add::run(&mut self.store, request, self.config.max_upload_bytes)
    }

    pub fn list_documents(&self, search: Option<&str>) -> Result<commands::CmdResult> {
        commands::list::run(&self.store, search)
    }

    pub fn view_documents<I: AsRef<str>>(&self, selectors: &[I]) -> Result<commands::CmdResult> {
        let selectors = parse_selectors(selectors)?;
        commands::view::run(&self.store, &selectors)
    }

    pub fn delete_documents<I: AsRef<str>>(
        &mut self,
        selectors: &[I],
    ) -> Result<commands::CmdResult> {
        let selectors = parse_selectors(selectors)?;
        commands::delete::run(&mut self.store, &selectors)
    }

    /// Converts one document; `None` uses the configured default quality.
    pub async fn convert_document(
        &self,
        selector: &str,
        quality: Option<Quality>,
    ) -> Result<commands::CmdResult> {
        let selector = parse_selector(selector)?;
        let quality = quality.unwrap_or(self.config.default_quality);
        commands::convert::run(&self.store, &self.engine, &selector, quality).await
    }

    pub fn export_documents<I: AsRef<str>>(&self, selectors: &[I]) -> Result<commands::CmdResult> {
        let selectors = parse_selectors(selectors)?;
        commands::export::run(&self.store, &selectors)
    }

    pub fn config(&self, action: ConfigAction) -> Result<commands::CmdResult> {
        commands::config::run(&self.paths, action)
    }

    pub fn data_paths(&self) -> Result<commands::CmdResult> {
        commands::paths::run(&self.store, &self.paths)
    }

    pub fn paths(&self) -> &commands::DocshelfPaths {
        &self.paths
    }
}

fn parse_selector(input: &str) -> Result<DocSelector> {
    input.parse().map_err(DocshelfError::Api)
}

fn parse_selectors<I: AsRef<str>>(inputs: &[I]) -> Result<Vec<DocSelector>> {
    if inputs.is_empty() {
        return Err(DocshelfError::Api(
            "No document selected (give an index or an id)".to_string(),
        ));
    }
    inputs.iter().map(|s| parse_selector(s.as_ref())).collect()
}

pub use crate::commands::config::ConfigAction;
pub use commands::{Artifact, CmdMessage, CmdResult, DocshelfPaths, MessageLevel};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::ConverterOptions;
    use crate::input::MemoryFile;
    use crate::store::memory::InMemoryStore;
    use std::time::Duration;

    fn api() -> DocshelfApi<InMemoryStore> {
        let engine = ConversionEngine::new(ConverterOptions {
            settle_delay: Duration::ZERO,
            jpeg_quality: 60,
        });
        let paths = DocshelfPaths {
            data_dir: std::env::temp_dir(),
        };
        DocshelfApi::new(InMemoryStore::new(), engine, ShelfConfig::default(), paths)
    }

    #[test]
    fn add_then_list_and_delete_by_index() {
        let mut api = api();
        let file = MemoryFile::new("todo.txt", None, b"milk".to_vec());
        api.add_document(None, None, Some(&file)).unwrap();

        let listed = api.list_documents(None).unwrap();
        assert_eq!(listed.listed_documents.len(), 1);

        api.delete_documents(&["1"]).unwrap();
        assert!(api.list_documents(None).unwrap().listed_documents.is_empty());
    }

    #[test]
    fn add_uses_configured_upload_limit() {
        let mut api = api();
        api.config.max_upload_bytes = 2;
        let file = MemoryFile::new("todo.txt", None, b"milk".to_vec());
        assert!(api.add_document(None, None, Some(&file)).is_err());
    }

    #[test]
    fn empty_selector_list_is_rejected() {
        let api = api();
        let none: [&str; 0] = [];
        assert!(matches!(
            api.view_documents(&none),
            Err(DocshelfError::Api(_))
        ));
        assert!(matches!(api.view_documents(&["0"]), Err(DocshelfError::Api(_))));
    }

    #[tokio::test]
    async fn convert_defaults_to_configured_quality() {
        let mut api = api();
        let file = MemoryFile::new("todo.txt", None, b"milk".to_vec());
        api.add_document(None, None, Some(&file)).unwrap();

        let result = api.convert_document("1", None).await.unwrap();
        assert_eq!(result.artifacts[0].filename, "todo.pdf");
    }
}

//! # Commands
//!
//! One module per operation. Commands hold the logic, take a [`DataStore`]
//! (and a [`ConversionEngine`] where needed) and return a [`CmdResult`]. They
//! never print and never write outside the store: converted or exported
//! files come back as [`Artifact`]s and the UI decides where they go.
//!
//! [`DataStore`]: crate::store::DataStore
//! [`ConversionEngine`]: crate::convert::ConversionEngine

use crate::config::ShelfConfig;
use crate::index::DisplayDocument;
use crate::model::DocumentRecord;
use std::path::PathBuf;

pub mod add;
pub mod config;
pub mod convert;
pub mod delete;
pub mod export;
pub mod helpers;
pub mod list;
pub mod paths;
pub mod view;

#[derive(Debug, Clone)]
pub struct DocshelfPaths {
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self::new(MessageLevel::Info, content)
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self::new(MessageLevel::Success, content)
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self::new(MessageLevel::Warning, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(MessageLevel::Error, content)
    }

    fn new(level: MessageLevel, content: impl Into<String>) -> Self {
        Self {
            level,
            content: content.into(),
        }
    }
}

/// A file produced by a command, ready to be handed to the download helper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_documents: Vec<DocumentRecord>,
    pub listed_documents: Vec<DisplayDocument>,
    pub artifacts: Vec<Artifact>,
    pub paths: Vec<PathBuf>,
    pub config: Option<ShelfConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_documents(mut self, documents: Vec<DocumentRecord>) -> Self {
        self.affected_documents = documents;
        self
    }

    pub fn with_listed_documents(mut self, documents: Vec<DisplayDocument>) -> Self {
        self.listed_documents = documents;
        self
    }

    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        self.artifacts.push(artifact);
        self
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_config(mut self, config: ShelfConfig) -> Self {
        self.config = Some(config);
        self
    }
}

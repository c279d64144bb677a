//! # Display Indexes
//!
//! Records are shown with a 1-based index in collection order. Indexes are
//! always assigned over the full collection, so a record keeps its index
//! whether or not a search filter hides its neighbours:
//!
//! ```text
//! 1. Budget 2024         (shown)
//! 2. Meeting notes       (hidden by --search budget)
//! 3. Budget draft        (shown as 3, not 2)
//! ```
//!
//! Commands accept either that index or the record id.

use crate::model::DocumentRecord;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayDocument {
    pub index: usize,
    pub record: DocumentRecord,
}

/// How the user refers to a document on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocSelector {
    Index(usize),
    Id(String),
}

impl fmt::Display for DocSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocSelector::Index(i) => write!(f, "{}", i),
            DocSelector::Id(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for DocSelector {
    type Err = String;

    /// Plain positive numbers are indexes; anything else is an id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Empty document selector".to_string());
        }
        match s.parse::<usize>() {
            Ok(0) => Err("Indexes start at 1".to_string()),
            Ok(n) => Ok(DocSelector::Index(n)),
            Err(_) => Ok(DocSelector::Id(s.to_string())),
        }
    }
}

impl DocSelector {
    pub fn matches(&self, doc: &DisplayDocument) -> bool {
        match self {
            DocSelector::Index(i) => doc.index == *i,
            DocSelector::Id(id) => doc.record.id == *id,
        }
    }
}

pub fn index_documents(records: Vec<DocumentRecord>) -> Vec<DisplayDocument> {
    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| DisplayDocument {
            index: i + 1,
            record,
        })
        .collect()
}

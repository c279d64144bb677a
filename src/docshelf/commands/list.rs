use crate::commands::CmdResult;
use crate::error::Result;
use crate::store::DataStore;

use super::helpers::indexed_documents;

/// Lists documents whose name contains `search`, ignoring case.
///
/// An absent or blank search term lists everything. Otherwise the term is
/// matched as given, surrounding spaces included.
pub fn run<S: DataStore>(store: &S, search: Option<&str>) -> Result<CmdResult> {
    let documents = indexed_documents(store)?;
    let term = search.unwrap_or_default().to_lowercase();

    let listed = if term.trim().is_empty() {
        documents
    } else {
        documents
            .into_iter()
            .filter(|doc| doc.record.name.to_lowercase().contains(&term))
            .collect()
    };

    Ok(CmdResult::default().with_listed_documents(listed))
}

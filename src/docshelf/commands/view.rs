use crate::commands::CmdResult;
use crate::error::Result;
use crate::index::DocSelector;
use crate::store::DataStore;

use super::helpers::documents_by_selectors;

pub fn run<S: DataStore>(store: &S, selectors: &[DocSelector]) -> Result<CmdResult> {
    let documents = documents_by_selectors(store, selectors)?;
    Ok(CmdResult::default().with_listed_documents(documents))
}

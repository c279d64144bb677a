use crate::error::{DocshelfError, Result};
use crate::index::{index_documents, DisplayDocument, DocSelector};
use crate::store::DataStore;

pub fn indexed_documents<S: DataStore>(store: &S) -> Result<Vec<DisplayDocument>> {
    Ok(index_documents(store.load()?))
}

/// Resolves every selector, failing on the first one that matches nothing.
pub fn documents_by_selectors<S: DataStore>(
    store: &S,
    selectors: &[DocSelector],
) -> Result<Vec<DisplayDocument>> {
    let indexed = indexed_documents(store)?;
    selectors
        .iter()
        .map(|selector| {
            indexed
                .iter()
                .find(|doc| selector.matches(doc))
                .cloned()
                .ok_or_else(|| DocshelfError::NotFound(selector.to_string()))
        })
        .collect()
}

pub fn document_by_selector<S: DataStore>(
    store: &S,
    selector: &DocSelector,
) -> Result<DisplayDocument> {
    let mut found = documents_by_selectors(store, std::slice::from_ref(selector))?;
    found
        .pop()
        .ok_or_else(|| DocshelfError::NotFound(selector.to_string()))
}

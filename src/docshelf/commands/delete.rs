use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::index::DocSelector;
use crate::store::DataStore;
use tracing::info;

use super::helpers::indexed_documents;

/// Removes the selected records and rewrites the collection.
///
/// Selectors that match nothing are reported and otherwise ignored, so
/// deleting an id that is already gone is a no-op. Confirmation is the
/// caller's job.
pub fn run<S: DataStore>(store: &mut S, selectors: &[DocSelector]) -> Result<CmdResult> {
    let documents = indexed_documents(store)?;
    let mut result = CmdResult::default();
    let mut doomed = Vec::new();

    for selector in selectors {
        match documents.iter().find(|doc| selector.matches(doc)) {
            Some(doc) if !doomed.contains(&doc.record.id) => doomed.push(doc.record.id.clone()),
            Some(_) => {}
            None => result.add_message(CmdMessage::info(format!(
                "No document matches {}; nothing deleted",
                selector
            ))),
        }
    }

    if doomed.is_empty() {
        return Ok(result);
    }

    let (removed, kept): (Vec<_>, Vec<_>) = documents
        .into_iter()
        .map(|doc| doc.record)
        .partition(|record| doomed.contains(&record.id));
    store.save(&kept)?;
    info!(count = removed.len(), "documents deleted");

    for record in &removed {
        result.add_message(CmdMessage::success(format!(
            "Document deleted: {}",
            record.name
        )));
    }
    Ok(result.with_affected_documents(removed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn deletes_exactly_the_selected_record() {
        let mut fixture = StoreFixture::new().with_documents(3);
        let before = fixture.store.load().unwrap();
        let target = before[1].id.clone();

        let result = run(&mut fixture.store, &[DocSelector::Id(target.clone())]).unwrap();
        let after = fixture.store.load().unwrap();
        assert_eq!(after.len(), 2);
        assert!(after.iter().all(|d| d.id != target));
        assert_eq!(after[0], before[0]);
        assert_eq!(after[1], before[2]);
        assert_eq!(result.affected_documents[0].id, target);
    }

    #[test]
    fn missing_id_is_a_noop() {
        let mut fixture = StoreFixture::new().with_documents(2);
        let before = fixture.store.load().unwrap();

        let result = run(&mut fixture.store, &[DocSelector::Id("gone".into())]).unwrap();
        assert_eq!(fixture.store.load().unwrap(), before);
        assert!(result.affected_documents.is_empty());
        assert_eq!(result.messages[0].level, MessageLevel::Info);
    }

    #[test]
    fn deletes_by_index_once_even_if_repeated() {
        let mut fixture = StoreFixture::new().with_documents(2);
        let result = run(
            &mut fixture.store,
            &[DocSelector::Index(1), DocSelector::Index(1)],
        )
        .unwrap();
        assert_eq!(result.affected_documents.len(), 1);
        assert_eq!(fixture.store.load().unwrap().len(), 1);
    }
}

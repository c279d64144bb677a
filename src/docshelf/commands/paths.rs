use crate::commands::{CmdResult, DocshelfPaths};
use crate::config::CONFIG_FILENAME;
use crate::error::Result;
use crate::store::DataStore;

/// Where the collection and the config live.
pub fn run<S: DataStore>(store: &S, paths: &DocshelfPaths) -> Result<CmdResult> {
    Ok(CmdResult::default().with_paths(vec![
        paths.data_dir.clone(),
        store.location(),
        paths.data_dir.join(CONFIG_FILENAME),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fs::FileStore;

    #[test]
    fn reports_data_store_and_config_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        let paths = DocshelfPaths {
            data_dir: dir.path().to_path_buf(),
        };

        let result = run(&store, &paths).unwrap();
        assert_eq!(
            result.paths,
            vec![
                dir.path().to_path_buf(),
                dir.path().join("documents.json"),
                dir.path().join("config.json"),
            ]
        );
    }
}

//! Persistence of expansion state between sessions.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::domain::ExpansionSnapshot;
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::traits::FileSystem;

/// Reads and writes [`ExpansionSnapshot`]s as JSON files.
pub struct ExpansionStore {
    fs: Arc<dyn FileSystem>,
}

impl ExpansionStore {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Load a snapshot; a missing file yields `None`.
    pub fn load(&self, path: &Path) -> InfraResult<Option<ExpansionSnapshot>> {
        if !self.fs.exists(path) {
            debug!(path = %path.display(), "no saved expansion state");
            return Ok(None);
        }
        let content = self
            .fs
            .read_to_string(path)
            .map_err(|e| InfraError::io(format!("read {}", path.display()), e))?;
        let snapshot = serde_json::from_str(&content).map_err(|e| InfraError::Json {
            context: format!("parse {}", path.display()),
            source: e,
        })?;
        Ok(Some(snapshot))
    }

    pub fn save(&self, path: &Path, snapshot: &ExpansionSnapshot) -> InfraResult<()> {
        let content = serde_json::to_string_pretty(snapshot).map_err(|e| InfraError::Json {
            context: format!("serialize {}", path.display()),
            source: e,
        })?;
        self.fs
            .write(path, &content)
            .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
        debug!(path = %path.display(), entries = snapshot.expanded.len(), "saved expansion state");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::traits::RealFileSystem;
    use tempfile::TempDir;

    #[test]
    fn given_snapshot_when_saved_and_loaded_then_matches() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");
        let store = ExpansionStore::new(Arc::new(RealFileSystem));
        let snapshot = ExpansionSnapshot {
            expanded: vec!["host:a.com".into(), "root".into()],
        };

        store.save(&path, &snapshot).unwrap();

        assert_eq!(store.load(&path).unwrap(), Some(snapshot));
    }

    #[test]
    fn given_missing_file_when_loading_then_none() {
        let temp = TempDir::new().unwrap();
        let store = ExpansionStore::new(Arc::new(RealFileSystem));
        assert_eq!(store.load(&temp.path().join("absent.json")).unwrap(), None);
    }

    #[test]
    fn given_garbage_file_when_loading_then_json_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();
        let store = ExpansionStore::new(Arc::new(RealFileSystem));
        assert!(matches!(store.load(&path), Err(InfraError::Json { .. })));
    }
}

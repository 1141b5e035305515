// Persistence adapter - the whole Root State serializes as one JSON value
// under a single well-known name after every store transition.

use crate::error::Result;
use crate::model::RootState;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Well-known filename for the persisted state.
pub const STATE_FILE_NAME: &str = "promptforge-state.json";

/// Durable storage for the Root State.
///
/// `load` is fail-soft: absent, unreadable, or malformed stored state comes
/// back as `None` and the caller starts fresh. `save` may fail; the store
/// logs the failure and keeps its in-memory state authoritative.
pub trait StateStore {
    fn load(&self) -> Option<RootState>;
    fn save(&self, state: &RootState) -> Result<()>;
}

/// File-backed storage: one JSON document in a data directory.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Storage rooted at a data directory; the state lives at
    /// `<data_dir>/promptforge-state.json`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(STATE_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStore {
    fn load(&self) -> Option<RootState> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(_) => return None,
        };
        match serde_json::from_str(&contents) {
            Ok(state) => Some(state),
            Err(e) => {
                log::warn!(
                    "Stored state at {} is malformed, starting fresh: {e}",
                    self.path.display()
                );
                None
            }
        }
    }

    fn save(&self, state: &RootState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    stored: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the stored value, as if a previous session had saved it.
    pub fn with_raw(raw: &str) -> Self {
        Self {
            stored: Mutex::new(Some(raw.to_string())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.stored.lock().unwrap().clone()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Option<RootState> {
        let stored = self.stored.lock().unwrap();
        stored
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
    }

    fn save(&self, state: &RootState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        *self.stored.lock().unwrap() = Some(json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Settings, Theme};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());

        let state = RootState {
            settings: Settings { theme: Theme::Rose },
            ..RootState::default()
        };
        store.save(&state).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_file_store_missing_file_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_file_store_malformed_json_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());
        fs::write(store.path(), "{ not json").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_file_store_creates_data_dir() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("nested").join("dir"));
        store.save(&RootState::default()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load().is_none());

        let state = RootState::default();
        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), state);
    }

    #[test]
    fn test_memory_store_malformed_seed_is_none() {
        let store = MemoryStore::with_raw("broken");
        assert!(store.load().is_none());
    }
}

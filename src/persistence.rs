//! Snapshot storage.
//!
//! The editing session persists its grid, style and size overrides as
//! independent JSON blobs under fixed keys. Storage itself is a collaborator
//! behind [`SnapshotStore`]; two implementations ship with the crate.
//!
//! # Directory Structure (`FileStore`)
//!
//! ```text
//! data/
//! ├── grid.json
//! ├── style.json
//! ├── col_widths.json
//! └── row_heights.json
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SketchError};
use crate::types::Grid;

/// Key of the grid snapshot.
pub const GRID_KEY: &str = "grid";
/// Key of the style snapshot.
pub const STYLE_KEY: &str = "style";
/// Key of the column width overrides.
pub const COL_WIDTHS_KEY: &str = "col_widths";
/// Key of the row height overrides.
pub const ROW_HEIGHTS_KEY: &str = "row_heights";

/// Key/value storage for JSON snapshots.
pub trait SnapshotStore {
    /// Read the blob stored under `key`, `None` if absent.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Store `blob` under `key`, replacing any previous value.
    fn save(&mut self, key: &str, blob: &str) -> Result<()>;
}

/// In-memory store, used by tests and the wasm surface.
///
/// Serializes as a flat `{key: blob}` object so a whole session can travel
/// as one JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, blob: &str) -> Result<()> {
        self.entries.insert(key.to_string(), blob.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per snapshot inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(SketchError::Other(format!("invalid snapshot key {key:?}")));
        }
        Ok(self.base_path.join(format!("{key}.json")))
    }
}

impl SnapshotStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, key: &str, blob: &str) -> Result<()> {
        let path = self.path_for(key)?;
        // Atomic replace
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, blob)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Load and parse the snapshot under `key`.
///
/// Absent snapshots give `T::default()` silently; unreadable or unparsable
/// ones give `T::default()` with a warning.
pub fn load_or_default<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: SnapshotStore + ?Sized,
{
    match store.load(key) {
        Ok(Some(blob)) => match serde_json::from_str(&blob) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to parse {key} snapshot, using defaults: {e}");
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!("Failed to read {key} snapshot, using defaults: {e}");
            T::default()
        }
    }
}

/// Load the grid snapshot, falling back to the sample table.
///
/// A snapshot that parses but breaks the merge invariants is rejected too.
pub fn load_grid<S: SnapshotStore + ?Sized>(store: &S) -> Grid {
    let blob = match store.load(GRID_KEY) {
        Ok(Some(blob)) => blob,
        Ok(None) => return Grid::sample(),
        Err(e) => {
            tracing::warn!("Failed to read grid snapshot, using sample table: {e}");
            return Grid::sample();
        }
    };
    match Grid::from_json(&blob) {
        Ok(grid) => grid,
        Err(e) => {
            tracing::warn!("Discarding grid snapshot, using sample table: {e}");
            Grid::sample()
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::types::{SizeOverrides, StyleConfig};

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert!(store.load(STYLE_KEY).unwrap().is_none());
        store.save(STYLE_KEY, "{}").unwrap();
        assert_eq!(store.load(STYLE_KEY).unwrap().as_deref(), Some("{}"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_missing_snapshots_give_defaults() {
        let store = MemoryStore::new();
        let style: StyleConfig = load_or_default(&store, STYLE_KEY);
        assert_eq!(style, StyleConfig::default());
        assert_eq!(load_grid(&store).values(), Grid::sample().values());
    }

    #[test]
    fn test_garbage_snapshot_gives_defaults() {
        let mut store = MemoryStore::new();
        store.save(COL_WIDTHS_KEY, "not json").unwrap();
        let widths: SizeOverrides = load_or_default(&store, COL_WIDTHS_KEY);
        assert!(widths.is_empty());
    }

    #[test]
    fn test_invalid_grid_snapshot_is_rejected() {
        let mut store = MemoryStore::new();
        // Hidden cell without an owner
        let blob = format!(
            r#"[[{{"id":"{}","value":"","hidden":true}}]]"#,
            crate::types::CellId::new()
        );
        store.save(GRID_KEY, &blob).unwrap();
        assert_eq!(load_grid(&store).values(), Grid::sample().values());
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let dir = std::env::temp_dir().join(format!("sketchtable-keys-{}", std::process::id()));
        let store = FileStore::new(&dir).unwrap();
        assert!(store.load("../escape").is_err());
        assert!(store.load("").is_err());
        let _ = fs::remove_dir_all(&dir);
    }
}

//! Directory-backed durable store
//!
//! Each key lives in `<root>/<hex(key)>.json`. Hex file names keep arbitrary
//! keys (slashes, spaces, unicode) safe on every filesystem. Writes land in a
//! temporary file in the same directory and are renamed over the target, so
//! a crash mid-write leaves the previous value intact.

use super::DurableStore;
use crate::error::StoreError;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const EXTENSION: &str = "json";

/// One file per key under a root directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open store rooted at `root`, creating the directory if needed
    ///
    /// # Errors
    /// - `StoreError::Io` if the directory cannot be created
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StoreError::io_error(&root, e))?;
        tracing::debug!(root = %root.display(), "file store opened");
        Ok(Self { root })
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding `key`
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{EXTENSION}", hex::encode(key.as_bytes())))
    }

    /// Delete the file for `key`; missing keys are not an error
    ///
    /// # Errors
    /// - `StoreError::Io` on any other filesystem failure
    pub fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io_error(path, e)),
        }
    }

    /// Keys currently stored, sorted
    ///
    /// Files that do not decode to a key are skipped.
    ///
    /// # Errors
    /// - `StoreError::Io` if the directory cannot be listed
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        let entries = fs::read_dir(&self.root).map_err(|e| StoreError::io_error(&self.root, e))?;

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StoreError::io_error(&self.root, e))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match hex::decode(stem).map(String::from_utf8) {
                Ok(Ok(key)) => keys.push(key),
                _ => tracing::debug!(path = %path.display(), "skipping foreign file"),
            }
        }
        keys.sort();
        Ok(keys)
    }
}

impl DurableStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io_error(path, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);

        let mut staged =
            NamedTempFile::new_in(&self.root).map_err(|e| StoreError::io_error(&self.root, e))?;
        staged
            .write_all(value.as_bytes())
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|e| StoreError::io_error(staged.path(), e))?;
        staged
            .persist(&path)
            .map_err(|e| StoreError::io_error(&path, e.error))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FileStore) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("store")).unwrap();
        (dir, store)
    }

    #[test]
    fn open_creates_directory() {
        let (_dir, store) = setup();
        assert!(store.root().is_dir());
    }

    #[test]
    fn missing_key_is_none() {
        let (_dir, store) = setup();
        assert!(store.get("nothing").unwrap().is_none());
    }

    #[test]
    fn set_then_get_round_trips_text() {
        let (_dir, store) = setup();
        store.set("editor-content", "{\"title\":\"Ch 1\"}").unwrap();
        assert_eq!(
            store.get("editor-content").unwrap().as_deref(),
            Some("{\"title\":\"Ch 1\"}")
        );
    }

    #[test]
    fn file_names_are_hex_encoded() {
        let (_dir, store) = setup();
        store.set("a/b c", "1").unwrap();
        let expected = store.root().join("612f622063.json");
        assert_eq!(store.path_for("a/b c"), expected);
        assert!(expected.is_file());
    }

    #[test]
    fn overwrite_replaces_contents() {
        let (_dir, store) = setup();
        store.set("k", "first").unwrap();
        store.set("k", "second").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn keys_lists_decoded_names_and_skips_foreign_files() {
        let (_dir, store) = setup();
        store.set("notes", "[]").unwrap();
        store.set("canvas-data", "{}").unwrap();
        fs::write(store.root().join("README.txt"), "hello").unwrap();
        fs::write(store.root().join("zz.json"), "{}").unwrap();

        assert_eq!(
            store.keys().unwrap(),
            vec!["canvas-data".to_string(), "notes".to_string()]
        );
    }

    #[test]
    fn remove_reports_whether_key_existed() {
        let (_dir, store) = setup();
        store.set("k", "v").unwrap();
        assert!(store.remove("k").unwrap());
        assert!(!store.remove("k").unwrap());
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn reopen_sees_previous_writes() {
        let (dir, store) = setup();
        store.set("k", "kept").unwrap();
        drop(store);

        let reopened = FileStore::open(dir.path().join("store")).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("kept"));
    }
}

//! Durable key-value storage.
//!
//! Every piece of persisted state (workout data, password hash, session)
//! lives under its own string key. The file-backed store keeps one file per
//! key. Writes go to a temp file that is renamed over the target, and a
//! sidecar lock file in the data directory keeps writers from overlapping
//! with readers.

use crate::{Error, Result};
use fs2::FileExt;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::NamedTempFile;

/// String-keyed storage for persisted state
pub trait KeyValueStore {
    /// Read the value under `key`, `None` if it was never written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous value entirely
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// Lock file name; keys starting with '.' are rejected so it never collides
const LOCK_FILE: &str = ".lock";

/// One file per key inside a data directory
#[derive(Clone, Debug)]
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Open the directory-wide lock file, creating it on first use
    fn lock_file(&self) -> Result<File> {
        std::fs::create_dir_all(&self.dir)?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.dir.join(LOCK_FILE))?;
        Ok(file)
    }

    /// Write through a temp file in the same directory so the rename is atomic
    fn write_atomic(&self, path: &Path, value: &str) -> Result<()> {
        let temp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(value.as_bytes())?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(Error::Other(format!("Invalid storage key '{}'", key)));
        }
        Ok(self.dir.join(key))
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let lock = self.lock_file()?;
        lock.lock_shared()?;

        let read = File::open(&path).and_then(|file| {
            let mut contents = String::new();
            std::io::BufReader::new(file).read_to_string(&mut contents)?;
            Ok(contents)
        });
        lock.unlock()?;

        let contents = match read {
            Ok(contents) => contents,
            // Removed between the existence check and the open
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!("Read key '{}' from {:?}", key, path);
        Ok(Some(contents))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let lock = self.lock_file()?;
        lock.lock_exclusive()?;
        let written = self.write_atomic(&path, value);
        lock.unlock()?;
        written?;

        tracing::debug!("Wrote key '{}' to {:?}", key, path);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if !self.dir.exists() {
            return Ok(());
        }
        let lock = self.lock_file()?;
        lock.lock_exclusive()?;
        let removed = std::fs::remove_file(&path);
        lock.unlock()?;

        match removed {
            Ok(()) => {
                tracing::debug!("Removed key '{}'", key);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store; clones share the same entries
#[derive(Clone, Debug, Default)]
pub struct MemoryKvStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let kv = FileKvStore::new(temp_dir.path().join("data"));

        assert_eq!(kv.get("gymTrackerData").unwrap(), None);

        kv.set("gymTrackerData", r#"{"workouts":[]}"#).unwrap();
        assert_eq!(
            kv.get("gymTrackerData").unwrap().as_deref(),
            Some(r#"{"workouts":[]}"#)
        );

        kv.set("gymTrackerData", "second").unwrap();
        assert_eq!(kv.get("gymTrackerData").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_file_store_remove_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let kv = FileKvStore::new(temp_dir.path());

        kv.set("gymTrackerAuth", "token").unwrap();
        kv.remove("gymTrackerAuth").unwrap();
        kv.remove("gymTrackerAuth").unwrap();
        assert_eq!(kv.get("gymTrackerAuth").unwrap(), None);
    }

    #[test]
    fn test_file_store_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let kv = FileKvStore::new(temp_dir.path());

        kv.set("gymTrackerData", "{}").unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "gymTrackerData" && e.file_name() != LOCK_FILE)
            .collect();
        assert!(extras.is_empty(), "Unexpected files: {:?}", extras);
    }

    #[test]
    fn test_file_store_releases_lock_after_write() {
        let temp_dir = tempfile::tempdir().unwrap();
        let kv = FileKvStore::new(temp_dir.path());

        kv.set("gymTrackerData", "{}").unwrap();

        let lock = File::open(temp_dir.path().join(LOCK_FILE)).unwrap();
        lock.try_lock_exclusive().unwrap();
        lock.unlock().unwrap();
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let temp_dir = tempfile::tempdir().unwrap();
        let kv = FileKvStore::new(temp_dir.path());

        assert!(kv.set("../escape", "x").is_err());
        assert!(kv.get("").is_err());
        assert!(kv.get(".hidden").is_err());
    }

    #[test]
    fn test_memory_store_clones_share_entries() {
        let kv = MemoryKvStore::new();
        let other = kv.clone();

        kv.set("a", "1").unwrap();
        assert_eq!(other.get("a").unwrap().as_deref(), Some("1"));

        other.remove("a").unwrap();
        assert_eq!(kv.get("a").unwrap(), None);
    }
}

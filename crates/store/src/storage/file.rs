//! File-backed storage backend.
//!
//! Each key is stored as `<dir>/<key>.json`. Every write goes to its own
//! uniquely named temporary file in the same directory, which is then renamed
//! over the target. Readers never observe a torn value, concurrent writers do
//! not clobber each other's temporary files, and the last rename wins.
//! Change notifications reach subscribers of this handle only; other
//! processes sharing the directory see changes on their next read.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::{ChangeNotifier, KeyValueStorage, Listener, StorageError, StorageEvent, Subscription};

/// Key-value storage rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    notifier: ChangeNotifier,
}

impl FileStorage {
    /// Use `dir` as the storage root. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            notifier: ChangeNotifier::new(),
        }
    }

    /// The storage root.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is empty, starts with a dot, or contains
    /// characters other than ASCII alphanumerics, `-`, `_` and `.`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

        if !valid {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }

        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        // Dropped (and deleted) on any early return
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;

        tracing::debug!(path = %path.display(), bytes = value.len(), "Wrote storage file");

        self.notifier.notify(&StorageEvent {
            key: key.to_owned(),
            new_value: Some(value.to_owned()),
        });
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                self.notifier.notify(&StorageEvent {
                    key: key.to_owned(),
                    new_value: None,
                });
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        self.notifier.subscribe(listener)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Barrier, Mutex};
    use std::thread;

    use super::*;

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_get_before_any_write() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));
        assert_eq!(storage.get("b2bCart").unwrap(), None);
    }

    #[test]
    fn test_set_creates_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        storage.set("b2bCart", "{\"items\":[]}").unwrap();

        let on_disk = fs::read_to_string(dir.path().join("nested/b2bCart.json")).unwrap();
        assert_eq!(on_disk, "{\"items\":[]}");
        assert_eq!(file_names(&dir.path().join("nested")), vec!["b2bCart.json"]);
    }

    #[test]
    fn test_concurrent_writers_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FileStorage::new(dir.path()));

        for round in 0..10 {
            let values: Vec<String> = ['a', 'b']
                .iter()
                .map(|c| c.to_string().repeat(512 * 1024 + round))
                .collect();
            let barrier = Arc::new(Barrier::new(values.len()));

            let writers: Vec<_> = values
                .iter()
                .cloned()
                .map(|value| {
                    let storage = Arc::clone(&storage);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        storage.set("b2bCart", &value)
                    })
                })
                .collect();

            for writer in writers {
                writer.join().unwrap().unwrap();
            }

            let stored = storage.get("b2bCart").unwrap().unwrap();
            assert!(values.contains(&stored), "round {round} stored a torn value");
        }

        assert_eq!(file_names(dir.path()), vec!["b2bCart.json"]);
    }

    #[test]
    fn test_failed_write_leaves_no_temporary_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        // A directory in the way makes the final rename fail
        fs::create_dir(dir.path().join("b2bCart.json")).unwrap();
        fs::write(dir.path().join("b2bCart.json/keep"), "x").unwrap();

        assert!(storage.set("b2bCart", "{}").is_err());
        assert_eq!(file_names(dir.path()), vec!["b2bCart.json"]);
    }

    #[test]
    fn test_two_handles_share_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FileStorage::new(dir.path());
        let reader = FileStorage::new(dir.path());

        writer.set("b2bCart", "one").unwrap();
        assert_eq!(reader.get("b2bCart").unwrap().as_deref(), Some("one"));
    }

    #[test]
    fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let _subscription = storage.subscribe(Arc::new(move |event: &StorageEvent| {
            sink.lock().unwrap().push(event.new_value.clone());
        }));

        storage.set("b2bCart", "{}").unwrap();
        storage.remove("b2bCart").unwrap();
        storage.remove("b2bCart").unwrap();

        assert_eq!(storage.get("b2bCart").unwrap(), None);
        assert_eq!(*events.lock().unwrap(), vec![Some("{}".to_owned()), None]);
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let storage = FileStorage::new("/tmp/unused");
        for key in ["", "../escape", ".hidden", "a/b", "a b"] {
            assert!(
                matches!(storage.path_for(key), Err(StorageError::InvalidKey(_))),
                "key {key:?} should be rejected"
            );
        }
        assert!(storage.path_for("b2bCart").is_ok());
    }
}

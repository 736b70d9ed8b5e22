//! In-memory storage backend.

use std::collections::HashMap;
use std::sync::RwLock;

use super::{ChangeNotifier, KeyValueStorage, Listener, StorageError, StorageEvent, Subscription};

/// Key-value storage held in process memory.
///
/// Optionally enforces a byte quota over all keys and values, mirroring the
/// size limit browsers place on local storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
    notifier: ChangeNotifier,
}

impl MemoryStorage {
    /// Create an empty storage without a quota.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty storage that rejects writes beyond `limit` bytes.
    #[must_use]
    pub fn with_quota(limit: usize) -> Self {
        Self {
            quota: Some(limit),
            ..Self::default()
        }
    }

    /// Create a storage pre-populated with `entries`, without notifying anyone.
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Bytes currently held (keys plus values).
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.entries
            .read()
            .map_or(0, |guard| guard.iter().map(|(k, v)| k.len() + v.len()).sum())
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self.entries.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        {
            let mut guard = self
                .entries
                .write()
                .map_err(|_| StorageError::LockPoisoned)?;

            if let Some(limit) = self.quota {
                let others: usize = guard
                    .iter()
                    .filter(|(k, _)| k.as_str() != key)
                    .map(|(k, v)| k.len() + v.len())
                    .sum();
                let needed = others + key.len() + value.len();
                if needed > limit {
                    return Err(StorageError::QuotaExceeded { needed, limit });
                }
            }

            guard.insert(key.to_owned(), value.to_owned());
        }

        self.notifier.notify(&StorageEvent {
            key: key.to_owned(),
            new_value: Some(value.to_owned()),
        });
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let removed = self
            .entries
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .remove(key);

        if removed.is_some() {
            self.notifier.notify(&StorageEvent {
                key: key.to_owned(),
                new_value: None,
            });
        }
        Ok(())
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        self.notifier.subscribe(listener)
    }
}

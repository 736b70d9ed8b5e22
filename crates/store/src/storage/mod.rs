//! Key-value storage the cart is persisted in.
//!
//! A storage handle is injected into the store rather than reached as a
//! global. Every successful write is announced to subscribers, which is how
//! other views sharing the same storage learn that they should reload.
//!
//! # Backends
//!
//! - [`MemoryStorage`] - in-process map with an optional byte quota
//! - [`FileStorage`] - one JSON file per key in a directory

mod file;
mod memory;

use std::fmt;
use std::sync::{Arc, RwLock, Weak};

use thiserror::Error;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying filesystem error.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The write would exceed the backend's size limit.
    #[error("storage quota exceeded: {needed} bytes needed, {limit} allowed")]
    QuotaExceeded {
        /// Bytes the store would hold after the write.
        needed: usize,
        /// Configured limit.
        limit: usize,
    },

    /// A previous holder of the backend lock panicked.
    #[error("storage lock poisoned")]
    LockPoisoned,

    /// The key cannot be mapped onto the backend.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// A change announced to subscribers after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// Key that changed.
    pub key: String,
    /// Value now stored, `None` after a removal.
    pub new_value: Option<String>,
}

/// Callback invoked for every [`StorageEvent`].
pub type Listener = Arc<dyn Fn(&StorageEvent) + Send + Sync>;

/// Get/set of string values by key, plus change notification.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key` and notify subscribers.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key` and notify subscribers.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the removal.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Register a listener for changes. Dropping the returned
    /// [`Subscription`] unregisters it.
    fn subscribe(&self, listener: Listener) -> Subscription;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        (**self).subscribe(listener)
    }
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Listener registry shared by the storage backends.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    inner: Arc<RwLock<Listeners>>,
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.inner.read().map_or(0, |guard| guard.entries.len());
        f.debug_struct("ChangeNotifier")
            .field("listeners", &count)
            .finish()
    }
}

impl ChangeNotifier {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    pub fn subscribe(&self, listener: Listener) -> Subscription {
        let Ok(mut guard) = self.inner.write() else {
            tracing::warn!("Listener registry lock poisoned; subscription ignored");
            return Subscription::detached();
        };

        let id = guard.next_id;
        guard.next_id += 1;
        guard.entries.push((id, listener));
        drop(guard);

        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Call every registered listener with `event`.
    ///
    /// Listeners run outside the registry lock so they may read the storage
    /// or subscribe again.
    pub fn notify(&self, event: &StorageEvent) {
        let listeners: Vec<Listener> = match self.inner.read() {
            Ok(guard) => guard
                .entries
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect(),
            Err(_) => {
                tracing::warn!(key = %event.key, "Listener registry lock poisoned; change not announced");
                return;
            }
        };

        tracing::debug!(key = %event.key, listeners = listeners.len(), "Announcing storage change");

        for listener in listeners {
            listener(event);
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().map_or(0, |guard| guard.entries.len())
    }

    /// Whether no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle keeping a listener registered.
#[must_use = "dropping a Subscription unregisters its listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<RwLock<Listeners>>,
}

impl Subscription {
    /// A subscription that is not attached to any registry.
    pub const fn detached() -> Self {
        Self {
            id: 0,
            registry: Weak::new(),
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("attached", &(self.registry.strong_count() > 0))
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        if let Ok(mut guard) = registry.write() {
            guard.entries.retain(|(id, _)| *id != self.id);
        }
    }
}

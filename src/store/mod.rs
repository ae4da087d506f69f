// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Persistent collections.
//!
//! This module provides:
//! - Backends: opaque key-value storage (memory or a directory of JSON files)
//! - Store: typed `get`/`put` of whole collections over a backend
//! - Events: publish/subscribe notification of collection changes
//! - Watcher: external edits to a data directory republished as events

pub mod backend;
pub mod events;
pub mod watcher;

pub use backend::{FileBackend, KeyValueBackend, MemoryBackend, WriteJournal};
pub use events::{EventBus, EventOrigin, StoreEvent, Subscription};
pub use watcher::StoreWatcher;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Logical collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// User-authored chord library
    CustomChords,
    /// Saved jams (progression snapshots)
    SavedJams,
    /// The chords currently being arranged into a jam
    Workspace,
    /// Dark mode flag
    DarkMode,
}

impl Collection {
    /// Every collection
    pub const ALL: [Collection; 4] = [
        Collection::CustomChords,
        Collection::SavedJams,
        Collection::Workspace,
        Collection::DarkMode,
    ];

    /// Storage key
    pub fn key(self) -> &'static str {
        match self {
            Collection::CustomChords => "customChords",
            Collection::SavedJams => "savedJams",
            Collection::Workspace => "workspaceChords",
            Collection::DarkMode => "darkMode",
        }
    }

    /// Collection for a storage key
    pub fn from_key(key: &str) -> Option<Self> {
        Collection::ALL.into_iter().find(|c| c.key() == key)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Storage failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend failed for {collection}")]
    Backend {
        collection: Collection,
        #[source]
        source: io::Error,
    },

    #[error("stored {collection} is not valid JSON for its records")]
    Corrupt {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode {collection}")]
    Encode {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not open data directory {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("store is not backed by a directory; nothing to watch")]
    NotWatchable,
}

/// Typed repository over a key-value backend.
///
/// Collections are read and written whole. Every successful `put` publishes a
/// local [`StoreEvent`] on the store's [`EventBus`].
pub struct Store {
    backend: Box<dyn KeyValueBackend>,
    bus: EventBus,
    directory: Option<(PathBuf, WriteJournal)>,
}

impl Store {
    /// Store over any backend
    pub fn new(backend: impl KeyValueBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            bus: EventBus::new(),
            directory: None,
        }
    }

    /// Store that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Store backed by a data directory, created if missing
    pub fn open_dir<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let backend = FileBackend::open(dir.as_ref()).map_err(|source| StoreError::Open {
            path: dir.as_ref().to_path_buf(),
            source,
        })?;
        let directory = Some((backend.dir().to_path_buf(), backend.journal()));
        debug!(dir = ?backend.dir(), "opened store directory");
        Ok(Self {
            backend: Box::new(backend),
            bus: EventBus::new(),
            directory,
        })
    }

    /// Data directory, for directory-backed stores
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_ref().map(|(dir, _)| dir.as_path())
    }

    /// The store's event bus
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Subscribe to changes of one collection (or all with `None`)
    pub fn subscribe(&self, filter: Option<Collection>) -> Subscription {
        self.bus.subscribe(filter)
    }

    /// Watch the data directory for edits made by other processes
    pub fn watch(&self, debounce_ms: Option<u64>) -> anyhow::Result<StoreWatcher> {
        let (dir, journal) = self.directory.as_ref().ok_or(StoreError::NotWatchable)?;
        StoreWatcher::new(dir, journal.clone(), self.bus.clone(), debounce_ms)
    }

    /// Read a whole collection. A collection that was never written is empty.
    pub fn get<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>, StoreError> {
        let raw = self.read_raw(collection)?;
        match raw {
            None => Ok(Vec::new()),
            Some(text) if text.trim().is_empty() => Ok(Vec::new()),
            Some(text) => serde_json::from_str(&text).map_err(|source| {
                warn!(%collection, error = %source, "stored collection failed to decode");
                StoreError::Corrupt { collection, source }
            }),
        }
    }

    /// Replace a whole collection
    pub fn put<T: Serialize>(&self, collection: Collection, records: &[T]) -> Result<(), StoreError> {
        let text = serde_json::to_string(records)
            .map_err(|source| StoreError::Encode { collection, source })?;
        self.write_raw(collection, &text)?;
        debug!(%collection, records = records.len(), "wrote collection");
        Ok(())
    }

    /// Dark mode flag, stored as the string `"true"` or `"false"`
    pub fn dark_mode(&self) -> Result<bool, StoreError> {
        Ok(self
            .read_raw(Collection::DarkMode)?
            .is_some_and(|v| v.trim() == "true"))
    }

    /// Set the dark mode flag
    pub fn set_dark_mode(&self, enabled: bool) -> Result<(), StoreError> {
        self.write_raw(Collection::DarkMode, if enabled { "true" } else { "false" })
    }

    /// Remove a collection entirely
    pub fn clear(&self, collection: Collection) -> Result<(), StoreError> {
        self.backend
            .remove(collection.key())
            .map_err(|source| StoreError::Backend { collection, source })?;
        self.bus.publish(StoreEvent::local(collection));
        Ok(())
    }

    fn read_raw(&self, collection: Collection) -> Result<Option<String>, StoreError> {
        self.backend
            .read(collection.key())
            .map_err(|source| StoreError::Backend { collection, source })
    }

    fn write_raw(&self, collection: Collection, text: &str) -> Result<(), StoreError> {
        self.backend
            .write(collection.key(), text)
            .map_err(|source| StoreError::Backend { collection, source })?;
        self.bus.publish(StoreEvent::local(collection));
        Ok(())
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("directory", &self.directory())
            .field("bus", &self.bus)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_collection_keys() {
        assert_eq!(Collection::CustomChords.key(), "customChords");
        assert_eq!(Collection::SavedJams.key(), "savedJams");
        assert_eq!(Collection::from_key("darkMode"), Some(Collection::DarkMode));
        assert_eq!(Collection::from_key("nope"), None);
    }

    #[test]
    fn test_get_missing_is_empty() {
        let store = Store::in_memory();
        let chords: Vec<String> = store.get(Collection::CustomChords).unwrap();
        assert!(chords.is_empty());
    }

    #[test]
    fn test_put_then_get() {
        let store = Store::in_memory();
        store
            .put(Collection::Workspace, &["a".to_string(), "b".to_string()])
            .unwrap();
        let back: Vec<String> = store.get(Collection::Workspace).unwrap();
        assert_eq!(back, vec!["a", "b"]);
    }

    #[test]
    fn test_put_publishes_event() {
        let store = Store::in_memory();
        let sub = store.subscribe(Some(Collection::SavedJams));
        store.put::<String>(Collection::SavedJams, &[]).unwrap();
        store.put::<String>(Collection::CustomChords, &[]).unwrap();
        assert_eq!(sub.recv_all(), vec![StoreEvent::local(Collection::SavedJams)]);
    }

    #[test]
    fn test_corrupt_collection_is_reported() {
        let backend = MemoryBackend::new();
        backend.write("customChords", "{not json").unwrap();
        let store = Store::new(backend);
        let result: Result<Vec<String>, _> = store.get(Collection::CustomChords);
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn test_dark_mode_flag() {
        let store = Store::in_memory();
        assert!(!store.dark_mode().unwrap());
        store.set_dark_mode(true).unwrap();
        assert!(store.dark_mode().unwrap());
        store.set_dark_mode(false).unwrap();
        assert!(!store.dark_mode().unwrap());
    }

    #[test]
    fn test_directory_store_persists() {
        let dir = tempdir().unwrap();
        {
            let store = Store::open_dir(dir.path()).unwrap();
            store.put(Collection::CustomChords, &[1u32, 2, 3]).unwrap();
        }
        let store = Store::open_dir(dir.path()).unwrap();
        let back: Vec<u32> = store.get(Collection::CustomChords).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
        assert_eq!(store.directory(), Some(dir.path()));
    }

    #[test]
    fn test_memory_store_is_not_watchable() {
        assert!(Store::in_memory().watch(None).is_err());
    }

    #[test]
    fn test_clear_collection() {
        let store = Store::in_memory();
        store.put(Collection::Workspace, &[1u8]).unwrap();
        store.clear(Collection::Workspace).unwrap();
        let back: Vec<u8> = store.get(Collection::Workspace).unwrap();
        assert!(back.is_empty());
    }
}

// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Key-value storage backends.
//!
//! A backend stores opaque strings under collection keys. [`MemoryBackend`]
//! is used by tests and throwaway sessions; [`FileBackend`] keeps one
//! `<key>.json` file per collection in a data directory.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Minimal key-value store
pub trait KeyValueBackend: Send + Sync {
    /// Read a value, `None` if the key has never been written
    fn read(&self, key: &str) -> io::Result<Option<String>>;

    /// Write (replace) a value
    fn write(&self, key: &str, value: &str) -> io::Result<()>;

    /// Remove a key; removing a missing key is not an error
    fn remove(&self, key: &str) -> io::Result<()>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-process backend
#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        Ok(lock(&self.values).get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        lock(&self.values).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        lock(&self.values).remove(key);
        Ok(())
    }
}

/// Contents most recently written by this process, per key.
///
/// The store watcher consults it to tell our own writes apart from edits
/// made by another process.
#[derive(Debug, Clone, Default)]
pub struct WriteJournal {
    written: Arc<Mutex<HashMap<String, String>>>,
}

impl WriteJournal {
    /// Record a local write
    pub fn record(&self, key: &str, value: &str) {
        lock(&self.written).insert(key.to_string(), value.to_string());
    }

    /// Forget a key (after a local remove)
    pub fn forget(&self, key: &str) {
        lock(&self.written).remove(key);
    }

    /// Whether `value` is exactly what this process last wrote under `key`
    pub fn is_own_write(&self, key: &str, value: Option<&str>) -> bool {
        let written = lock(&self.written);
        match (written.get(key), value) {
            (Some(ours), Some(value)) => ours == value,
            (None, None) => true,
            _ => false,
        }
    }
}

/// One JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
    journal: WriteJournal,
}

impl FileBackend {
    /// Open (creating if needed) a data directory
    pub fn open<P: AsRef<Path>>(dir: P) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            journal: WriteJournal::default(),
        })
    }

    /// Data directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Shared journal of this backend's writes
    pub fn journal(&self) -> WriteJournal {
        self.journal.clone()
    }

    /// File holding a key
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueBackend for FileBackend {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        // Write beside the target and rename so readers never see half a file
        let target = self.path_for(key);
        let staging = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&staging, value)?;
        fs::rename(&staging, &target)?;
        // Only contents that actually reached the disk count as our own
        self.journal.record(key, value);
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.journal.forget(key);
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

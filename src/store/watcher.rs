// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Data directory watcher.
//!
//! Another process (a second CLI invocation, a text editor, a sync client)
//! may rewrite a collection file while we hold the store open. The watcher
//! notices, waits for the edits to settle, and republishes each changed
//! collection as an external [`StoreEvent`] so subscribers can reload.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

use super::backend::WriteJournal;
use super::events::{EventBus, StoreEvent};
use super::Collection;

/// Default quiet period before a change is reported
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Watches a store directory and publishes external changes
pub struct StoreWatcher {
    _watcher: RecommendedWatcher,
    event_receiver: Receiver<StoreEvent>,
    watched_path: PathBuf,
}

impl StoreWatcher {
    /// Start watching `dir`.
    ///
    /// Changes are published on `bus` and also queued on the watcher itself
    /// (see [`StoreWatcher::recv_all`]). Files whose contents match what this
    /// process last wrote, per `journal`, are ignored.
    pub fn new<P: AsRef<Path>>(
        dir: P,
        journal: WriteJournal,
        bus: EventBus,
        debounce_ms: Option<u64>,
    ) -> Result<Self> {
        let watched_path = dir.as_ref().to_path_buf();
        let debounce_duration = Duration::from_millis(debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS));

        let (event_tx, event_rx): (Sender<StoreEvent>, Receiver<StoreEvent>) = mpsc::channel();
        let (notify_tx, notify_rx): (Sender<Event>, Receiver<Event>) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    let _ = notify_tx.send(event);
                }
            },
            Config::default(),
        )
        .map_err(|e| anyhow!("Failed to create file watcher: {}", e))?;

        watcher
            .watch(&watched_path, RecursiveMode::NonRecursive)
            .map_err(|e| anyhow!("Failed to watch path {:?}: {}", watched_path, e))?;

        let data_dir = watched_path.clone();
        std::thread::spawn(move || {
            let mut last_event_time: Option<Instant> = None;
            let mut pending: Vec<Collection> = Vec::new();

            loop {
                match notify_rx.recv_timeout(Duration::from_millis(50)) {
                    Ok(event) => {
                        if matches!(event.kind, EventKind::Access(_)) {
                            continue;
                        }
                        for collection in event.paths.iter().filter_map(|p| collection_for(p.as_path())) {
                            if !pending.contains(&collection) {
                                pending.push(collection);
                            }
                        }
                        last_event_time = Some(Instant::now());
                    }
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        let settled = last_event_time
                            .is_some_and(|last_time| last_time.elapsed() >= debounce_duration);
                        if !settled {
                            continue;
                        }
                        for collection in pending.drain(..) {
                            let contents = match read_collection(&data_dir, collection) {
                                Ok(contents) => contents,
                                Err(e) => {
                                    warn!(%collection, error = %e, "could not read changed collection");
                                    continue;
                                }
                            };
                            if journal.is_own_write(collection.key(), contents.as_deref()) {
                                continue;
                            }
                            debug!(%collection, "external change detected");
                            let event = StoreEvent::external(collection);
                            bus.publish(event);
                            let _ = event_tx.send(event);
                        }
                        last_event_time = None;
                    }
                    Err(mpsc::RecvTimeoutError::Disconnected) => {
                        // Watcher was dropped
                        break;
                    }
                }
            }
        });

        Ok(Self {
            _watcher: watcher,
            event_receiver: event_rx,
            watched_path,
        })
    }

    /// Try to receive the next external change (non-blocking)
    pub fn try_recv(&self) -> Option<StoreEvent> {
        self.event_receiver.try_recv().ok()
    }

    /// Receive all pending external changes
    pub fn recv_all(&self) -> Vec<StoreEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }

    /// Block up to `timeout` for the next external change
    pub fn recv_timeout(&self, timeout: Duration) -> Option<StoreEvent> {
        self.event_receiver.recv_timeout(timeout).ok()
    }

    /// Directory being watched
    pub fn watched_path(&self) -> &Path {
        &self.watched_path
    }
}

/// Collection stored in `path`, if it is a collection file
fn collection_for(path: &Path) -> Option<Collection> {
    if path.extension()? != "json" {
        return None;
    }
    Collection::from_key(path.file_stem()?.to_str()?)
}

fn read_collection(dir: &Path, collection: Collection) -> io::Result<Option<String>> {
    match fs::read_to_string(dir.join(format!("{}.json", collection.key()))) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileBackend, KeyValueBackend};
    use tempfile::tempdir;

    #[test]
    fn test_collection_for_path() {
        assert_eq!(
            collection_for(Path::new("/data/customChords.json")),
            Some(Collection::CustomChords)
        );
        assert_eq!(
            collection_for(Path::new("/data/workspaceChords.json")),
            Some(Collection::Workspace)
        );
        assert_eq!(collection_for(Path::new("/data/.savedJams.json.tmp")), None);
        assert_eq!(collection_for(Path::new("/data/notes.txt")), None);
        assert_eq!(collection_for(Path::new("/data/other.json")), None);
    }

    #[test]
    fn test_watcher_creation() {
        let dir = tempdir().unwrap();
        let watcher =
            StoreWatcher::new(dir.path(), WriteJournal::default(), EventBus::new(), Some(50))
                .unwrap();
        assert_eq!(watcher.watched_path(), dir.path());
        assert!(watcher.recv_all().is_empty());
    }

    #[test]
    fn test_watcher_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");
        let result = StoreWatcher::new(&missing, WriteJournal::default(), EventBus::new(), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_watcher_reports_external_edit() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        let bus = EventBus::new();
        let sub = bus.subscribe(None);
        let watcher = StoreWatcher::new(dir.path(), backend.journal(), bus, Some(50)).unwrap();

        std::thread::sleep(Duration::from_millis(50));
        fs::write(dir.path().join("savedJams.json"), "[]").unwrap();

        // The event may not arrive in every CI sandbox, so only check what did arrive
        if let Some(event) = watcher.recv_timeout(Duration::from_millis(1000)) {
            assert_eq!(event, StoreEvent::external(Collection::SavedJams));
            assert_eq!(sub.try_recv(), Some(event));
        }
    }

    #[test]
    fn test_watcher_ignores_own_writes() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        let watcher =
            StoreWatcher::new(dir.path(), backend.journal(), EventBus::new(), Some(50)).unwrap();

        backend.write("customChords", "[]").unwrap();
        std::thread::sleep(Duration::from_millis(300));
        assert!(watcher.recv_all().is_empty());
    }
}

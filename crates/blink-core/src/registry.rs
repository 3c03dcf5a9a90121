//! In-memory record of tracked files and their latest attestation.

use crate::attest::{attest_file, Attestation, BoundDigest, Timestamp};
use crate::error::Result;
use crate::hasher::ContentDigest;
use serde::Serialize;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::{info, warn};

const EVENT_CAPACITY: usize = 64;

/// Snapshot of one tracked file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedEntry {
    pub path: PathBuf,
    pub content: ContentDigest,
    pub time: Timestamp,
    pub bound: BoundDigest,
}

/// Emitted when a scan finds that a tracked file's content changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftEvent {
    pub path: PathBuf,
    pub previous: Attestation,
    pub current: Attestation,
}

/// Counts from one [`Registry::check_for_changes`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub checked: usize,
    pub drifted: usize,
    /// Paths that could not be read this pass; their entries are kept.
    pub failed: usize,
}

/// Map from absolute path to the last attestation recorded for it.
///
/// Every hash-then-write for a path happens under that path's update lock,
/// so `track` and scans on the same path never interleave. The map lock is
/// only held to read or write entries, never across file I/O. Drift is
/// decided on the content digest, since the bound digest changes with every
/// new timestamp.
pub struct Registry {
    entries: Mutex<HashMap<PathBuf, Attestation>>,
    updates: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
    events: broadcast::Sender<DriftEvent>,
}

impl Registry {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: Mutex::new(HashMap::new()),
            updates: Mutex::new(HashMap::new()),
            events,
        }
    }

    /// Attest `path` now and record it, replacing any earlier entry.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn track(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let resolved = match resolve(path) {
            Ok(resolved) => resolved,
            Err(err) => {
                warn!(file = %path.display(), error = %err, "unable to resolve path; not tracking");
                return;
            }
        };

        let update = self.update_lock(&resolved);
        let _guard = update.lock().unwrap_or_else(PoisonError::into_inner);
        match attest_file(&resolved) {
            Ok(attestation) => {
                self.lock().insert(resolved, attestation);
            }
            Err(err) => {
                warn!(error = %err, "unable to hash file; not tracking");
            }
        }
    }

    /// Re-hash every tracked file and record any whose content changed.
    pub fn check_for_changes(&self) -> ScanReport {
        let mut report = ScanReport::default();
        for path in self.paths() {
            report.checked += 1;
            match self.rescan(&path) {
                Ok(Some(event)) => {
                    report.drifted += 1;
                    info!(
                        file = %event.path.display(),
                        previous = %event.previous.bound,
                        current = %event.current.bound,
                        "drift detected"
                    );
                    // No subscribers is fine.
                    let _ = self.events.send(event);
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(error = %err, "tracked file unreadable; keeping last entry");
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Re-attest one tracked path while holding its update lock.
    fn rescan(&self, path: &Path) -> Result<Option<DriftEvent>> {
        let update = self.update_lock(path);
        let _guard = update.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(seen) = self.lock().get(path).map(|att| att.content) else {
            return Ok(None);
        };
        let fresh = attest_file(path)?;
        if fresh.content == seen {
            return Ok(None);
        }

        let previous = self.lock().insert(path.to_path_buf(), fresh.clone());
        Ok(previous.map(|previous| DriftEvent {
            path: path.to_path_buf(),
            previous,
            current: fresh,
        }))
    }

    /// Receive a [`DriftEvent`] for every recorded change from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DriftEvent> {
        self.events.subscribe()
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<TrackedEntry> {
        let path = resolve(path.as_ref()).ok()?;
        let entries = self.lock();
        entries.get(&path).map(|att| TrackedEntry {
            path: path.clone(),
            content: att.content,
            time: att.time,
            bound: att.bound.clone(),
        })
    }

    pub fn bound_digest(&self, path: impl AsRef<Path>) -> Option<BoundDigest> {
        self.get(path).map(|entry| entry.bound)
    }

    /// Tracked paths, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.lock().keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn update_lock(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut updates = self.updates.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(updates.entry(path.to_path_buf()).or_default())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, Attestation>> {
        // Writers only ever swap whole values, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve(path: &Path) -> io::Result<PathBuf> {
    std::path::absolute(path)
}

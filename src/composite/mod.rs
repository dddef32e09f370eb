// src/composite/mod.rs
//! Aggregation of capture units into one session
//!
//! A [`CompositeLogger`] subscribes itself to every child [`DataLogger`]
//! and merges their entry streams into a single in-memory history, with
//! an optional XML file mirror. Its own observers see the merged stream.
//!
//! # Architecture
//!
//! ```text
//! DataLogger (key)   ──┐
//! DataLogger (move)  ──┼──> CompositeLogger ──> history + LogStore
//! DataLogger (click) ──┘          │
//!                                 └──> LogObserver fan-out
//! ```
//!
//! History and file stay consistent because both are updated as one unit
//! under a single lock; observer fan-out happens after that unit commits.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::capture::{DataLogger, LogObserver, LoggerKind};
use crate::errors::Result;
use crate::event::LogEntry;
use crate::store::LogStore;

/// Counts from opening a log file
#[derive(Debug, Clone, Copy)]
pub struct LoadReport {
    /// Entries loaded into the session.
    pub loaded: usize,

    /// Entries the document held but the codec could not read.
    pub skipped: usize,
}

/// Merged history plus its optional file mirror, one locked unit
struct CompositeInner {
    entries: Vec<LogEntry>,
    store: Option<LogStore>,
}

/// The session-level logger aggregating child capture units
pub struct CompositeLogger {
    /// Session gate; closed composites ignore child entries entirely
    recording: AtomicBool,

    /// Whether dispatch workers have been started
    started: AtomicBool,

    /// Child capture units in registration order
    children: RwLock<Vec<Arc<DataLogger>>>,

    /// Observers of the merged stream
    observers: RwLock<Vec<Arc<dyn LogObserver>>>,

    /// History and file, updated together
    inner: Mutex<CompositeInner>,
}

impl CompositeLogger {
    /// Create an empty session, recording enabled, no file bound
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            recording: AtomicBool::new(true),
            started: AtomicBool::new(false),
            children: RwLock::new(Vec::new()),
            observers: RwLock::new(Vec::new()),
            inner: Mutex::new(CompositeInner {
                entries: Vec::new(),
                store: None,
            }),
        })
    }

    /// Add a child capture unit
    ///
    /// The child inherits the session's recording gate, and its dispatch
    /// worker is started if the session is already running. The child
    /// list lock is held across the whole operation, so a concurrent
    /// gate flip or start cannot slip in between inherit and
    /// registration.
    pub fn add_logger(self: &Arc<Self>, child: Arc<DataLogger>) {
        let mut children = self.children.write();
        child.set_recording(self.is_recording());
        let observer: Arc<dyn LogObserver> = self.clone();
        child.add_observer(observer);
        if self.started.load(Ordering::SeqCst) {
            child.start();
        }
        debug!(kind = child.type_name(), "added child logger");
        children.push(child);
    }

    /// Remove a child by identity; it keeps its current gate state
    pub fn remove_logger(self: &Arc<Self>, child: &Arc<DataLogger>) {
        let mut children = self.children.write();
        if let Some(index) = children.iter().position(|c| Arc::ptr_eq(c, child)) {
            let removed = children.remove(index);
            let observer: Arc<dyn LogObserver> = self.clone();
            removed.remove_observer(&observer);
            debug!(kind = removed.type_name(), "removed child logger");
        }
    }

    /// Snapshot of the child loggers
    pub fn loggers(&self) -> Vec<Arc<DataLogger>> {
        self.children.read().clone()
    }

    pub fn logger_count(&self) -> usize {
        self.children.read().len()
    }

    /// Start every child's dispatch worker
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) {
        let children = self.children.write();
        self.started.store(true, Ordering::SeqCst);
        for child in children.iter() {
            child.start();
        }
    }

    /// Stop every child's dispatch worker
    pub fn shutdown(&self) {
        let children = self.children.write();
        self.started.store(false, Ordering::SeqCst);
        for child in children.iter() {
            child.shutdown();
        }
    }

    /// Register an observer of the merged stream
    pub fn add_observer(&self, observer: Arc<dyn LogObserver>) {
        self.observers.write().push(observer);
    }

    /// Remove an observer by identity
    pub fn remove_observer(&self, observer: &Arc<dyn LogObserver>) {
        self.observers
            .write()
            .retain(|existing| !Arc::ptr_eq(existing, observer));
    }

    /// Open or close the session gate, cascading to children first
    ///
    /// Holds the child list lock across cascade and flag store; an add
    /// racing this call lands wholly before or wholly after the flip.
    pub fn set_recording(&self, recording: bool) {
        let children = self.children.write();
        for child in children.iter() {
            child.set_recording(recording);
        }
        self.recording.store(recording, Ordering::SeqCst);
        info!(recording, children = children.len(), "recording gate cascaded");
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    /// Snapshot of the merged history, oldest first
    pub fn entries(&self) -> Vec<LogEntry> {
        self.inner.lock().entries.clone()
    }

    pub fn entry_count(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Drop the in-memory history; a bound log file keeps its contents
    pub fn clear_all(&self) {
        let mut inner = self.inner.lock();
        let cleared = inner.entries.len();
        inner.entries.clear();
        debug!(cleared, "cleared in-memory history");
    }

    /// Bind a fresh log file, truncating anything at `path`
    ///
    /// Entries already in the history stay memory-only; the file receives
    /// what is logged from now on. On failure the previous binding, if
    /// any, stays in place.
    pub fn set_log_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.store = Some(LogStore::create(path.as_ref())?);
        Ok(())
    }

    /// Path of the bound log file, if one is set
    pub fn log_file(&self) -> Option<PathBuf> {
        self.inner
            .lock()
            .store
            .as_ref()
            .map(|store| store.path().to_path_buf())
    }

    /// Replace the session with the contents of a log file
    ///
    /// The document is parsed, then written back in a single rewrite,
    /// before the session is touched; a malformed file or a failed write
    /// leaves the current session exactly as it was. Loaded entries
    /// carry no source tag and bypass the recording gate, but are fanned
    /// out to the session's observers like live ones. The file stays
    /// bound for subsequent appends.
    pub fn open_log_file(&self, path: impl AsRef<Path>) -> Result<LoadReport> {
        let path = path.as_ref();
        let outcome = LogStore::load(path)?;

        let mut inner = self.inner.lock();
        let store = LogStore::create_with(path, outcome.entries.clone())?;
        inner.entries.clear();
        inner.entries.extend(outcome.entries.iter().cloned());
        inner.store = Some(store);
        drop(inner);

        for entry in &outcome.entries {
            self.fan_out(entry);
        }

        let report = LoadReport {
            loaded: outcome.entries.len(),
            skipped: outcome.skipped,
        };
        info!(
            path = %path.display(),
            loaded = report.loaded,
            skipped = report.skipped,
            "opened log file"
        );
        Ok(report)
    }

    /// Render the history the way the log pane shows it
    ///
    /// Messages concatenate in history order, with a newline inserted
    /// whenever the source logger changes.
    pub fn render_log(&self) -> String {
        let inner = self.inner.lock();
        let mut out = String::new();
        let mut last_source: Option<Option<LoggerKind>> = None;

        for entry in &inner.entries {
            if let Some(previous) = last_source {
                if previous != entry.source() {
                    out.push('\n');
                }
            }
            last_source = Some(entry.source());
            out.push_str(entry.message());
        }

        out
    }

    /// Commit one entry to history and file as a unit
    fn ingest(&self, entry: &LogEntry) {
        let mut inner = self.inner.lock();
        inner.entries.push(entry.clone());
        if let Some(store) = inner.store.as_mut() {
            if let Err(error) = store.append(entry) {
                error!(error = %error, "failed to persist log entry");
            }
        }
    }

    /// Deliver one entry to the session's own observers
    fn fan_out(&self, entry: &LogEntry) {
        // Snapshot so observers may (un)register from inside their own
        // callback without deadlocking.
        let observers: Vec<_> = self.observers.read().clone();
        for observer in observers {
            if let Err(error) = observer.notify_log(entry) {
                warn!(
                    error = %error,
                    "session observer failed, continuing with remaining observers"
                );
            }
        }
    }
}

impl LogObserver for CompositeLogger {
    fn notify_log(&self, entry: &LogEntry) -> Result<()> {
        if !self.recording.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.ingest(entry);
        self.fan_out(entry);
        Ok(())
    }
}

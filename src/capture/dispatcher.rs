// src/capture/dispatcher.rs
//! Per-logger dispatch worker
//!
//! Each logger owns one [`Dispatcher`]: a bounded [`EntryQueue`] fed from
//! the hook thread plus a background task that drains it on a fixed
//! cadence and fans entries out to observers.
//!
//! # Architecture
//!
//! ```text
//! hook thread → submit() → EntryQueue → worker task (poll every 10ms)
//!                           (bounded)        ↓
//!                                     notify_log() per observer,
//!                                     registration order, failures
//!                                     isolated
//! ```
//!
//! FIFO order is guaranteed within one dispatcher; nothing is guaranteed
//! across dispatchers.

use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::capture::logger::LogObserver;
use crate::capture::queue::{EntryQueue, QueueStats, DEFAULT_QUEUE_CAPACITY};
use crate::event::LogEntry;

/// Dispatch settings
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Capacity of the bounded entry queue
    pub queue_capacity: usize,

    /// How often the worker polls the queue
    pub poll_interval: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            poll_interval: Duration::from_millis(10),
        }
    }
}

/// Bounded queue plus background fan-out worker
pub struct Dispatcher {
    /// Label used in log output, normally the owning logger's type name
    label: &'static str,

    /// Entry buffer between capture and dispatch
    queue: Arc<EntryQueue>,

    /// Observers in registration order
    observers: Arc<RwLock<Vec<Arc<dyn LogObserver>>>>,

    /// Worker liveness flag, checked once per poll cycle
    running: Arc<AtomicBool>,

    /// Handle of the spawned worker, kept only to detect double starts
    worker: Mutex<Option<JoinHandle<()>>>,

    config: DispatcherConfig,
}

impl Dispatcher {
    /// Create a dispatcher; the worker is not started yet
    pub fn new(label: &'static str, config: DispatcherConfig) -> Self {
        Self {
            label,
            queue: Arc::new(EntryQueue::new(config.queue_capacity)),
            observers: Arc::new(RwLock::new(Vec::new())),
            running: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
            config,
        }
    }

    /// Spawn the dispatch worker
    ///
    /// Must be called from within a Tokio runtime. Calling it again while
    /// the worker lives is a no-op.
    pub fn start(&self) {
        let mut worker = self.worker.lock();
        if worker.is_some() {
            debug!(logger = self.label, "dispatch worker already running");
            return;
        }

        self.running.store(true, Ordering::SeqCst);

        let label = self.label;
        let queue = Arc::clone(&self.queue);
        let observers = Arc::clone(&self.observers);
        let running = Arc::clone(&self.running);
        let poll_interval = self.config.poll_interval;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_interval);

            loop {
                interval.tick().await;
                if !running.load(Ordering::SeqCst) {
                    break;
                }

                while let Some(entry) = queue.try_pop() {
                    // Snapshot so observers may (un)register from inside
                    // their own callback without deadlocking.
                    let snapshot: Vec<Arc<dyn LogObserver>> = observers.read().clone();
                    for observer in snapshot {
                        if let Err(error) = observer.notify_log(&entry) {
                            warn!(
                                logger = label,
                                error = %error,
                                "observer failed, continuing with remaining observers"
                            );
                        }
                    }
                }
            }

            debug!(logger = label, "dispatch worker stopped");
        });

        *worker = Some(handle);
        debug!(logger = self.label, "dispatch worker started");
    }

    /// Queue one entry for delivery
    ///
    /// Returns `false` when the queue is full; the entry is dropped and
    /// the drop counted.
    pub fn submit(&self, entry: LogEntry) -> bool {
        match self.queue.push(entry) {
            Ok(()) => true,
            Err(dropped) => {
                warn!(
                    logger = self.label,
                    message = dropped.message(),
                    dropped_total = self.queue.stats().drop_count,
                    "dispatch queue full, dropping entry"
                );
                false
            }
        }
    }

    /// Append an observer to the notification order
    pub fn add_observer(&self, observer: Arc<dyn LogObserver>) {
        self.observers.write().push(observer);
    }

    /// Remove an observer by `Arc` identity
    pub fn remove_observer(&self, observer: &Arc<dyn LogObserver>) {
        self.observers
            .write()
            .retain(|existing| !Arc::ptr_eq(existing, observer));
    }

    /// Number of registered observers
    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }

    /// Counters of the underlying queue
    pub fn queue_stats(&self) -> QueueStats {
        self.queue.stats()
    }

    /// Whether the worker is live
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the worker at its next poll boundary
    ///
    /// The worker is detached, never joined; remaining queued entries are
    /// not drained.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.worker.lock().take();
        debug!(logger = self.label, "dispatch worker shutting down");
    }
}

// src/replay/engine.rs
//! Replay of a recorded session through an injector
//!
//! The engine walks a timestamp-sorted entry list on a blocking worker,
//! turning each event back into injector calls. Timed mode reproduces the
//! recorded gaps between entries, discounting however long the injection
//! itself took; fast mode only waits for the injector to settle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::{Error, Result};
use crate::event::{KeyPhase, LogEntry, LogEvent};
use crate::replay::injector::{InjectorProvider, InputInjector};

/// How the worker paces between entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayMode {
    /// Inject as fast as the injector settles.
    Fast,

    /// Reproduce the recorded timestamp gaps.
    Timed,
}

/// Observer of replay progress
///
/// Callbacks run on the replay worker; keep them short.
pub trait ReplayObserver: Send + Sync {
    /// Called after each entry has been injected
    fn event_replayed(&self, _index: usize, _entry: &LogEntry) {}

    /// Called exactly once when the run ends, stopped or complete
    fn replay_finished(&self) {}
}

/// Drives one entry list through an injector, one run at a time
pub struct ReplayEngine {
    /// Entries in injection order
    entries: Vec<LogEntry>,

    /// True from a successful start until the worker exits
    running: Arc<AtomicBool>,

    /// Checked by the worker at each entry boundary
    stop_requested: Arc<AtomicBool>,

    /// Observers of replay progress
    observers: Arc<RwLock<Vec<Arc<dyn ReplayObserver>>>>,

    /// Handle of the current or most recent worker
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ReplayEngine {
    /// Build an engine over `entries`, sorting them by timestamp
    ///
    /// The sort is stable, so entries sharing a timestamp keep their
    /// given order.
    pub fn new(mut entries: Vec<LogEntry>) -> Self {
        entries.sort_by_key(|entry| entry.timestamp());
        Self {
            entries,
            running: Arc::new(AtomicBool::new(false)),
            stop_requested: Arc::new(AtomicBool::new(false)),
            observers: Arc::new(RwLock::new(Vec::new())),
            worker: Mutex::new(None),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register an observer of replay progress
    pub fn add_observer(&self, observer: Arc<dyn ReplayObserver>) {
        self.observers.write().push(observer);
    }

    /// Remove an observer by identity
    pub fn remove_observer(&self, observer: &Arc<dyn ReplayObserver>) {
        self.observers
            .write()
            .retain(|existing| !Arc::ptr_eq(existing, observer));
    }

    /// Start a replay run
    ///
    /// The injector is acquired before the worker spawns, so an
    /// unavailable injector surfaces here and the engine stays idle.
    /// While a run is in progress further starts fail.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self, provider: &dyn InjectorProvider, mode: ReplayMode) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(Error::ReplayAlreadyRunning);
        }
        self.stop_requested.store(false, Ordering::SeqCst);

        let injector = match provider.acquire() {
            Ok(injector) => injector,
            Err(error) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(error);
            }
        };

        let entries = self.entries.clone();
        let running = Arc::clone(&self.running);
        let stop = Arc::clone(&self.stop_requested);
        let observers = Arc::clone(&self.observers);

        let handle = tokio::task::spawn_blocking(move || {
            run_replay(injector, &entries, mode, &stop, &observers);
            running.store(false, Ordering::SeqCst);
        });
        *self.worker.lock() = Some(handle);

        Ok(())
    }

    /// Start a run that ignores recorded timing
    pub fn start_fast(&self, provider: &dyn InjectorProvider) -> Result<()> {
        self.start(provider, ReplayMode::Fast)
    }

    /// Start a run that reproduces recorded timing
    pub fn start_timed(&self, provider: &dyn InjectorProvider) -> Result<()> {
        self.start(provider, ReplayMode::Timed)
    }

    /// Ask the current run to stop at its next entry boundary
    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Wait for the current run's worker to exit
    pub async fn join(&self) {
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

/// The blocking replay loop
fn run_replay(
    mut injector: Box<dyn InputInjector>,
    entries: &[LogEntry],
    mode: ReplayMode,
    stop: &AtomicBool,
    observers: &RwLock<Vec<Arc<dyn ReplayObserver>>>,
) {
    info!(count = entries.len(), ?mode, "replay started");

    for (index, entry) in entries.iter().enumerate() {
        if stop.load(Ordering::SeqCst) {
            info!(replayed = index, "replay stopped");
            break;
        }

        let injected_at = Instant::now();
        if let Err(error) = inject_event(injector.as_mut(), entry.event()) {
            warn!(error = %error, index, "injection failed, skipping event");
        }
        if let Err(error) = injector.wait_idle() {
            warn!(error = %error, index, "injector did not settle");
        }

        let snapshot: Vec<_> = observers.read().clone();
        for observer in snapshot {
            observer.event_replayed(index, entry);
        }

        if mode == ReplayMode::Timed {
            if let Some(next) = entries.get(index + 1) {
                let gap = (next.timestamp() - entry.timestamp()).max(0) as u64;
                let gap = Duration::from_millis(gap);
                if let Some(remaining) = gap.checked_sub(injected_at.elapsed()) {
                    thread::sleep(remaining);
                }
            }
        }
    }

    let snapshot: Vec<_> = observers.read().clone();
    for observer in snapshot {
        observer.replay_finished();
    }
    info!("replay finished");
}

/// Turn one recorded event back into injector calls
fn inject_event(injector: &mut dyn InputInjector, event: &LogEvent) -> Result<()> {
    match *event {
        LogEvent::Key {
            phase, key_code, ..
        } => {
            // Entries loaded from old documents may lack a usable code.
            if key_code <= 0 {
                debug!(key_code, "no key code recorded, nothing to inject");
                return Ok(());
            }
            match phase {
                KeyPhase::Pressed => injector.press_key(key_code),
                KeyPhase::Released => injector.release_key(key_code),
                KeyPhase::Typed => {
                    injector.press_key(key_code)?;
                    injector.release_key(key_code)
                }
            }
        }
        LogEvent::MouseMoved { x, y } => injector.move_mouse(x, y),
        LogEvent::MouseDragged { x, y, button } => {
            injector.press_button(button)?;
            injector.move_mouse(x, y)?;
            injector.release_button(button)
        }
        LogEvent::MouseClicked { x, y, button, .. } => {
            injector.move_mouse(x, y)?;
            injector.press_button(button)?;
            injector.release_button(button)
        }
        LogEvent::MousePressed { x, y, button, .. } => {
            injector.move_mouse(x, y)?;
            injector.press_button(button)
        }
        LogEvent::MouseReleased { x, y, button, .. } => {
            injector.move_mouse(x, y)?;
            injector.release_button(button)
        }
        LogEvent::MouseWheelMoved { x, y, rotation } => {
            injector.move_mouse(x, y)?;
            injector.scroll_wheel(rotation)
        }
    }
}

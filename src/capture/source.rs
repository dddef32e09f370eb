// src/capture/source.rs
//! Platform hook seam
//!
//! The platform hook that actually taps keyboard and mouse input lives
//! outside this crate. It is abstracted as an [`InputSource`] delivering
//! raw [`LogEvent`]s to registered [`InputListener`]s on its own thread.
//! [`DataLogger`] implements `InputListener`, so wiring a logger to a
//! source is a single `subscribe` call.
//!
//! [`ManualSource`] is a trivial in-process source for embedding and for
//! driving the pipeline from tests.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::capture::logger::DataLogger;
use crate::errors::Result;
use crate::event::LogEvent;

/// Receiver of raw events from an input source
pub trait InputListener: Send + Sync {
    /// Handle one raw event; called on the source's thread, must return
    /// quickly
    fn on_event(&self, event: LogEvent);
}

/// Provider of raw input events
pub trait InputSource: Send + Sync {
    /// Register a listener for future events
    fn subscribe(&self, listener: Arc<dyn InputListener>) -> Result<()>;

    /// Unregister a listener by identity
    fn unsubscribe(&self, listener: &Arc<dyn InputListener>) -> Result<()>;
}

impl InputListener for DataLogger {
    fn on_event(&self, event: LogEvent) {
        self.capture(event);
    }
}

/// In-process fan-out source
///
/// Events handed to [`ManualSource::emit`] are forwarded synchronously to
/// every listener in subscription order.
#[derive(Default)]
pub struct ManualSource {
    listeners: RwLock<Vec<Arc<dyn InputListener>>>,
}

impl ManualSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one event to all current listeners
    pub fn emit(&self, event: LogEvent) {
        let snapshot: Vec<Arc<dyn InputListener>> = self.listeners.read().clone();
        for listener in snapshot {
            listener.on_event(event.clone());
        }
    }

    /// Number of subscribed listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl InputSource for ManualSource {
    fn subscribe(&self, listener: Arc<dyn InputListener>) -> Result<()> {
        self.listeners.write().push(listener);
        Ok(())
    }

    fn unsubscribe(&self, listener: &Arc<dyn InputListener>) -> Result<()> {
        self.listeners
            .write()
            .retain(|existing| !Arc::ptr_eq(existing, listener));
        Ok(())
    }
}

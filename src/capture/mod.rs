// src/capture/mod.rs
//! Event capture and asynchronous dispatch
//!
//! This module turns raw input events into observer notifications without
//! ever blocking the thread that delivers them:
//!
//! - **Logger**: per-kind capture units with a recording gate
//! - **Dispatcher**: per-logger background worker fanning entries out
//! - **Queue**: bounded lock-free buffer between capture and dispatch
//! - **Source**: the platform hook seam
//!
//! # Architecture
//!
//! ```text
//! InputSource (hook thread)
//!      ↓ on_event()
//! DataLogger ── recording gate ── message rendering
//!      ↓ submit()
//! EntryQueue (bounded, capacity 25)
//!      ↓ try_pop() every 10ms
//! dispatch worker → LogObserver … LogObserver   (registration order)
//! ```
//!
//! Ordering is FIFO within one logger's stream; nothing is promised
//! across loggers. A full queue drops the newest entry and counts it.

pub mod dispatcher;
pub mod logger;
pub mod queue;
pub mod source;

// Re-export commonly used types
pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use logger::{DataLogger, LogObserver, LoggerKind};
pub use queue::{EntryQueue, QueueStats, DEFAULT_QUEUE_CAPACITY};
pub use source::{InputListener, InputSource, ManualSource};

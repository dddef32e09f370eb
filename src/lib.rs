// src/lib.rs
//! Inputlog
//!
//! This library provides the core components for capturing input events,
//! merging them into a session history, persisting that history as XML
//! and replaying it with faithful timing.
//!
//! # Architecture
//!
//! The crate is structured into several key modules:
//!
//! - **event**: Event kinds, log entries and message rendering
//! - **capture**: Per-kind capture units with bounded async dispatch
//! - **composite**: Session-level aggregation of capture units
//! - **store**: XML persistence with atomic whole-document rewrites
//! - **replay**: Timing-faithful replay through a pluggable injector
//! - **export**: Plain-text and JSON views of the history
//! - **errors**: Crate-wide error and result types

// Public module exports
pub mod capture;
pub mod composite;
pub mod errors;
pub mod event;
pub mod export;
pub mod replay;
pub mod store;

// Re-export commonly used types
pub use capture::{DataLogger, LogObserver, LoggerKind};
pub use composite::CompositeLogger;
pub use errors::{Error, Result};
pub use event::{LogEntry, LogEvent};
pub use replay::{ReplayEngine, ReplayMode};
pub use store::LogStore;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// src/event/mod.rs
//! Event data model
//!
//! The leaf types every other module builds on:
//!
//! - **LogEvent**: closed, kind-tagged payload of one captured input event
//! - **KeyPhase**: pressed/released/typed discriminant for key events
//! - **LogEntry**: timestamped record pairing a message with its event
//!
//! Events are immutable values. Entries carry an optional provenance tag
//! ([`crate::capture::LoggerKind`]) that is excluded from equality and
//! never persisted.

pub mod entry;
pub mod kinds;

// Re-export commonly used types
pub use entry::LogEntry;
pub use kinds::{button_name, KeyPhase, LogEvent};

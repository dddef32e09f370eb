// src/event/entry.rs
//! Timestamped log records
//!
//! A [`LogEntry`] pairs a human-readable message with the structured
//! [`LogEvent`] it describes. The producing logger is remembered only as a
//! [`LoggerKind`] tag: it is runtime provenance for grouping and display,
//! never persisted and never part of equality.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capture::logger::LoggerKind;
use crate::event::kinds::LogEvent;

/// One captured, timestamped record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Kind of the logger that produced this entry; `None` for entries
    /// reloaded from a file
    #[serde(skip)]
    source: Option<LoggerKind>,

    /// Human-readable description of the event
    message: String,

    /// The structured event payload
    event: LogEvent,

    /// Capture time in milliseconds since the Unix epoch
    timestamp: i64,
}

impl LogEntry {
    /// Create an entry stamped with the current wall-clock time
    ///
    /// # Panics
    ///
    /// Panics if `message` is empty.
    pub fn new(source: Option<LoggerKind>, message: impl Into<String>, event: LogEvent) -> Self {
        Self::with_timestamp(source, message, event, Utc::now().timestamp_millis())
    }

    /// Create an entry with an explicit capture timestamp
    ///
    /// # Panics
    ///
    /// Panics if `message` is empty or `timestamp` is negative.
    pub fn with_timestamp(
        source: Option<LoggerKind>,
        message: impl Into<String>,
        event: LogEvent,
        timestamp: i64,
    ) -> Self {
        let message = message.into();
        assert!(!message.is_empty(), "log entry message must not be empty");
        assert!(timestamp >= 0, "log entry timestamp must not be negative");

        Self {
            source,
            message,
            event,
            timestamp,
        }
    }

    /// Kind of the producing logger, if known
    pub fn source(&self) -> Option<LoggerKind> {
        self.source
    }

    /// The human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The structured event payload
    pub fn event(&self) -> &LogEvent {
        &self.event
    }

    /// Capture time in milliseconds since the Unix epoch
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Copy of this entry with the source tag cleared, as produced by the
    /// load path
    pub fn without_source(&self) -> Self {
        Self {
            source: None,
            message: self.message.clone(),
            event: self.event.clone(),
            timestamp: self.timestamp,
        }
    }
}

// Source is provenance, not identity: two entries are the same record if
// message, event and timestamp agree.
impl PartialEq for LogEntry {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message
            && self.event == other.event
            && self.timestamp == other.timestamp
    }
}

impl Eq for LogEntry {}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

// src/errors.rs
//! Crate-wide error and result types
//!
//! All fallible operations return [`Result`]; file-system variants carry
//! the offending path so persistence failures are diagnosable without
//! extra context at the call site.

use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the capture, persistence and replay layers
#[derive(Debug, Error)]
pub enum Error {
    /// File-system failure on the log file
    #[error("i/o error on log file {path}: {source}")]
    Io {
        /// Path of the file being read or written
        path: PathBuf,
        /// Underlying i/o error
        #[source]
        source: std::io::Error,
    },

    /// XML syntax error while reading a log document
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// JSON serialization failure during export
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Document structure does not match the expected log layout
    #[error("malformed log document: {0}")]
    MalformedDocument(String),

    /// An element is missing a required attribute
    #[error("missing attribute `{attribute}` on <{element}>")]
    MissingAttribute {
        /// Element the attribute was expected on
        element: &'static str,
        /// Name of the missing attribute
        attribute: &'static str,
    },

    /// An attribute is present but its value does not parse
    #[error("invalid value {value:?} for attribute `{attribute}` on <{element}>")]
    InvalidAttribute {
        /// Element carrying the attribute
        element: &'static str,
        /// Name of the offending attribute
        attribute: &'static str,
        /// The raw attribute value
        value: String,
    },

    /// An entry names an event kind this build does not know
    #[error("unknown event kind `{0}`")]
    UnknownEventKind(String),

    /// A key event names a phase outside pressed/released/typed
    #[error("unknown key phase `{0}`")]
    UnknownKeyPhase(String),

    /// An observer rejected an entry
    #[error("observer failure: {0}")]
    Observer(String),

    /// The synthetic-input injector could not be acquired
    #[error("input injector unavailable: {0}")]
    InjectorUnavailable(String),

    /// A replay was started while another is still running
    #[error("replay already running")]
    ReplayAlreadyRunning,
}

impl Error {
    /// Wrap an i/o error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// src/export/mod.rs
//! Plain-text and JSON views of the history
//!
//! Two ways out of the XML document: a one-shot export of a finished
//! history, and [`TextLogObserver`], which tails the live stream into any
//! writer the way the log pane renders it.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use parking_lot::Mutex;
use tracing::info;

use crate::capture::{LogObserver, LoggerKind};
use crate::errors::{Error, Result};
use crate::event::LogEntry;

/// Serialization of a one-shot export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Pretty-printed JSON array of entries.
    Json,

    /// The plain-text rendering the log pane shows.
    Text,
}

/// Write `entries` to a file in the chosen format
pub fn export_entries(
    entries: &[LogEntry],
    format: ExportFormat,
    path: impl AsRef<Path>,
) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| Error::io(path.to_path_buf(), source))?;
    let mut writer = BufWriter::new(file);

    match format {
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, entries)?;
            writer
                .write_all(b"\n")
                .and_then(|()| writer.flush())
                .map_err(|source| Error::io(path.to_path_buf(), source))?;
        }
        ExportFormat::Text => {
            write_text(&mut writer, entries).map_err(|source| Error::io(path.to_path_buf(), source))?;
        }
    }

    info!(path = %path.display(), count = entries.len(), ?format, "exported history");
    Ok(())
}

/// The log-pane text rendering: messages in order, a newline inserted
/// whenever the source logger changes
fn write_text<W: Write>(writer: &mut W, entries: &[LogEntry]) -> io::Result<()> {
    let mut last_source: Option<Option<LoggerKind>> = None;
    for entry in entries {
        if let Some(previous) = last_source {
            if previous != entry.source() {
                writer.write_all(b"\n")?;
            }
        }
        last_source = Some(entry.source());
        writer.write_all(entry.message().as_bytes())?;
    }
    writer.flush()
}

/// Tracks the previous entry's source between notifications
struct TextState<W> {
    writer: W,
    last_source: Option<Option<LoggerKind>>,
}

/// Observer that streams the live history as plain text
///
/// Attach to a [`CompositeLogger`](crate::composite::CompositeLogger) to
/// tail the session into a file or any other writer. Output is flushed
/// per entry.
pub struct TextLogObserver<W: Write + Send> {
    state: Mutex<TextState<W>>,
}

impl<W: Write + Send> TextLogObserver<W> {
    pub fn new(writer: W) -> Self {
        Self {
            state: Mutex::new(TextState {
                writer,
                last_source: None,
            }),
        }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.state.into_inner().writer
    }
}

impl<W: Write + Send> LogObserver for TextLogObserver<W> {
    fn notify_log(&self, entry: &LogEntry) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(previous) = state.last_source {
            if previous != entry.source() {
                state
                    .writer
                    .write_all(b"\n")
                    .map_err(|error| Error::Observer(error.to_string()))?;
            }
        }
        state.last_source = Some(entry.source());
        state
            .writer
            .write_all(entry.message().as_bytes())
            .and_then(|()| state.writer.flush())
            .map_err(|error| Error::Observer(error.to_string()))
    }
}

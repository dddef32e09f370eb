// src/store/log_store.rs
//! File-backed log document
//!
//! A `LogStore` owns one XML document on disk and mirrors it in memory.
//! Every append rewrites the whole document through a temp-file rename so
//! the file on disk is always a complete, parseable document.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::codec;
use crate::errors::{Error, Result};
use crate::event::LogEntry;

/// What a document read produced
#[derive(Debug)]
pub struct LoadOutcome {
    /// Entries decoded in document order, none carrying a source tag.
    pub entries: Vec<LogEntry>,

    /// Entries dropped for per-entry reasons such as an unknown kind.
    pub skipped: usize,
}

/// One log file and its in-memory mirror
#[derive(Debug)]
pub struct LogStore {
    path: PathBuf,
    document: Vec<LogEntry>,
}

impl LogStore {
    /// Bind a fresh, empty document to `path`, truncating anything there
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        Self::create_with(path, Vec::new())
    }

    /// Bind `path` and persist `entries` as its complete document
    ///
    /// One rewrite regardless of the entry count; on failure nothing at
    /// `path` is replaced.
    pub fn create_with(path: impl Into<PathBuf>, entries: Vec<LogEntry>) -> Result<Self> {
        let store = Self {
            path: path.into(),
            document: entries,
        };
        store.rewrite()?;
        info!(
            path = %store.path.display(),
            entries = store.document.len(),
            "bound log file"
        );
        Ok(store)
    }

    /// Parse the document at `path` without binding to it
    pub fn load(path: impl AsRef<Path>) -> Result<LoadOutcome> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).map_err(|source| Error::io(path.to_path_buf(), source))?;
        let (entries, skipped) = codec::read_document(&text)?;

        if skipped > 0 {
            warn!(
                path = %path.display(),
                loaded = entries.len(),
                skipped,
                "log file contained unreadable entries"
            );
        } else {
            debug!(path = %path.display(), loaded = entries.len(), "log file parsed");
        }

        Ok(LoadOutcome { entries, skipped })
    }

    /// Append one entry and persist the updated document
    ///
    /// On a write failure the entry stays in the in-memory mirror, so the
    /// next successful append carries it to disk as well.
    pub fn append(&mut self, entry: &LogEntry) -> Result<()> {
        self.document.push(entry.clone());
        self.rewrite()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.document
    }

    pub fn len(&self) -> usize {
        self.document.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }

    fn rewrite(&self) -> Result<()> {
        let mut buf = Vec::new();
        codec::write_document(&mut buf, &self.document)?;
        atomic_write(&self.path, &buf)
    }
}

/// Replace `path` with `bytes` through a same-directory temp file
fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");

    let mut file = File::create(&tmp).map_err(|source| Error::io(tmp.clone(), source))?;
    file.write_all(bytes)
        .map_err(|source| Error::io(tmp.clone(), source))?;
    file.sync_all()
        .map_err(|source| Error::io(tmp.clone(), source))?;
    drop(file);

    fs::rename(&tmp, path).map_err(|source| Error::io(path.to_path_buf(), source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{KeyPhase, LogEvent};
    use tempfile::tempdir;

    fn entry(message: &str, timestamp: i64) -> LogEntry {
        LogEntry::with_timestamp(
            None,
            message,
            LogEvent::Key {
                phase: KeyPhase::Typed,
                key_code: 30,
                character: 'a',
            },
            timestamp,
        )
    }

    #[test]
    fn test_create_writes_an_empty_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.xml");

        let store = LogStore::create(&path).unwrap();
        assert!(store.is_empty());

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("<entries>"));

        let outcome = LogStore::load(&path).unwrap();
        assert!(outcome.entries.is_empty());
        assert_eq!(outcome.skipped, 0);
    }

    #[test]
    fn test_append_then_load_preserves_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.xml");

        let mut store = LogStore::create(&path).unwrap();
        store.append(&entry("a", 10)).unwrap();
        store.append(&entry("b", 20)).unwrap();
        store.append(&entry("c", 30)).unwrap();
        assert_eq!(store.len(), 3);

        let outcome = LogStore::load(&path).unwrap();
        assert_eq!(outcome.skipped, 0);
        let messages: Vec<_> = outcome.entries.iter().map(|e| e.message()).collect();
        assert_eq!(messages, ["a", "b", "c"]);
        assert_eq!(outcome.entries[1].timestamp(), 20);
    }

    #[test]
    fn test_create_truncates_an_existing_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.xml");

        let mut store = LogStore::create(&path).unwrap();
        store.append(&entry("old", 1)).unwrap();

        let store = LogStore::create(&path).unwrap();
        assert!(store.is_empty());
        assert!(LogStore::load(&path).unwrap().entries.is_empty());
    }

    #[test]
    fn test_create_with_persists_in_one_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.xml");
        let entries = vec![entry("a", 1), entry("b", 2), entry("c", 3)];

        let store = LogStore::create_with(&path, entries).unwrap();
        assert_eq!(store.len(), 3);
        assert!(!path.with_extension("tmp").exists());

        let outcome = LogStore::load(&path).unwrap();
        assert_eq!(outcome.skipped, 0);
        let messages: Vec<_> = outcome.entries.iter().map(|e| e.message()).collect();
        assert_eq!(messages, ["a", "b", "c"]);
    }

    #[test]
    fn test_no_temp_file_survives_an_append() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.xml");

        let mut store = LogStore::create(&path).unwrap();
        store.append(&entry("a", 1)).unwrap();

        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_load_reports_unreadable_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.xml");
        fs::write(
            &path,
            "<entries>\
               <entry msg=\"x\" timestamp=\"1\" type=\"Gesture\"><event x=\"0\" y=\"0\"/></entry>\
               <entry msg=\"ok\" timestamp=\"2\" type=\"MouseMoved\"><event x=\"3\" y=\"4\"/></entry>\
             </entries>",
        )
        .unwrap();

        let outcome = LogStore::load(&path).unwrap();
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(outcome.entries[0].message(), "ok");
    }

    #[test]
    fn test_load_failures() {
        let dir = tempdir().unwrap();

        assert!(matches!(
            LogStore::load(dir.path().join("absent.xml")),
            Err(Error::Io { .. })
        ));

        let garbled = dir.path().join("garbled.xml");
        fs::write(&garbled, "<entries><entry msg=").unwrap();
        assert!(LogStore::load(&garbled).is_err());
    }
}

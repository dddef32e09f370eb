// src/store/mod.rs
//! XML persistence for log documents
//!
//! The store keeps every recorded entry in a single XML file and rewrites
//! that file in full on each append, always through an atomic rename.
//! Entries round-trip losslessly except for their source tag, which is
//! runtime provenance and never persisted.

pub mod codec;
pub mod log_store;

// Re-export commonly used types
pub use log_store::{LoadOutcome, LogStore};

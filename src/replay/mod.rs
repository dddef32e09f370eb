// src/replay/mod.rs
//! Timing-faithful replay of recorded sessions
//!
//! # Architecture
//!
//! ```text
//! Vec<LogEntry> ──sort by timestamp──> ReplayEngine
//!                                          │ spawn_blocking
//!                                          ▼
//!                                    replay worker ──> InputInjector
//!                                          │
//!                                          └──> ReplayObserver callbacks
//! ```
//!
//! The injector is acquired synchronously before the worker spawns, so
//! machines without injection support fail the start call rather than a
//! background task.

pub mod engine;
pub mod injector;

// Re-export commonly used types
pub use engine::{ReplayEngine, ReplayMode, ReplayObserver};
pub use injector::{InjectorProvider, InputInjector};

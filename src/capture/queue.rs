// src/capture/queue.rs
//! Bounded lock-free entry queue
//!
//! One queue sits between each logger's capture path (the hook thread) and
//! its dispatch worker. Pushes never block and never allocate; a full
//! queue rejects the entry and counts the drop so overflow is observable
//! instead of silent.

use crossbeam::queue::ArrayQueue;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::event::LogEntry;

/// Default capacity of a per-logger queue
///
/// Small on purpose: the worker drains every poll cycle, so depth only
/// builds up when observers stall.
pub const DEFAULT_QUEUE_CAPACITY: usize = 25;

/// Bounded MPSC queue carrying entries from capture to dispatch
pub struct EntryQueue {
    /// Underlying bounded queue
    queue: ArrayQueue<LogEntry>,

    /// Total entries accepted
    push_count: AtomicU64,

    /// Total entries handed to the worker
    pop_count: AtomicU64,

    /// Total entries rejected because the queue was full
    drop_count: AtomicU64,
}

impl EntryQueue {
    /// Create a queue with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: ArrayQueue::new(capacity),
            push_count: AtomicU64::new(0),
            pop_count: AtomicU64::new(0),
            drop_count: AtomicU64::new(0),
        }
    }

    /// Push an entry (non-blocking, lock-free)
    ///
    /// On a full queue the entry is handed back and the drop counter
    /// incremented; the caller decides how loudly to report it.
    pub fn push(&self, entry: LogEntry) -> Result<(), LogEntry> {
        match self.queue.push(entry) {
            Ok(()) => {
                self.push_count.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(entry) => {
                self.drop_count.fetch_add(1, Ordering::Relaxed);
                Err(entry)
            }
        }
    }

    /// Try to pop the oldest entry (non-blocking)
    pub fn try_pop(&self) -> Option<LogEntry> {
        match self.queue.pop() {
            Some(entry) => {
                self.pop_count.fetch_add(1, Ordering::Relaxed);
                Some(entry)
            }
            None => None,
        }
    }

    /// Snapshot of the queue counters
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            push_count: self.push_count.load(Ordering::Relaxed),
            pop_count: self.pop_count.load(Ordering::Relaxed),
            drop_count: self.drop_count.load(Ordering::Relaxed),
            depth: self.queue.len(),
            capacity: self.queue.capacity(),
        }
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Check if the queue is full
    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }

    /// Current number of buffered entries
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Fixed capacity of the queue
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}

/// Queue counters at one point in time
#[derive(Debug, Clone)]
pub struct QueueStats {
    /// Total entries accepted
    pub push_count: u64,

    /// Total entries handed to the worker
    pub pop_count: u64,

    /// Total entries rejected (queue full)
    pub drop_count: u64,

    /// Buffered entries at snapshot time
    pub depth: usize,

    /// Fixed queue capacity
    pub capacity: usize,
}

impl QueueStats {
    /// Buffered entries as a percentage of capacity
    pub fn fill_percentage(&self) -> f64 {
        (self.depth as f64 / self.capacity as f64) * 100.0
    }

    /// Dropped entries as a percentage of capture attempts
    pub fn drop_rate(&self) -> f64 {
        let attempts = self.push_count + self.drop_count;
        if attempts == 0 {
            0.0
        } else {
            (self.drop_count as f64 / attempts as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{KeyPhase, LogEvent};
    use std::sync::Arc;

    fn entry(ch: char, timestamp: i64) -> LogEntry {
        LogEntry::with_timestamp(
            None,
            ch.to_string(),
            LogEvent::Key {
                phase: KeyPhase::Typed,
                key_code: 0,
                character: ch,
            },
            timestamp,
        )
    }

    #[test]
    fn test_queue_creation() {
        let queue = EntryQueue::new(DEFAULT_QUEUE_CAPACITY);
        assert_eq!(queue.capacity(), 25);
        assert_eq!(queue.len(), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_push_pop_fifo() {
        let queue = EntryQueue::new(10);

        queue.push(entry('a', 1)).unwrap();
        queue.push(entry('b', 2)).unwrap();
        queue.push(entry('c', 3)).unwrap();

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.try_pop().unwrap().message(), "a");
        assert_eq!(queue.try_pop().unwrap().message(), "b");
        assert_eq!(queue.try_pop().unwrap().message(), "c");
        assert!(queue.try_pop().is_none());
    }

    #[test]
    fn test_full_queue_rejects_and_counts() {
        let queue = EntryQueue::new(2);

        queue.push(entry('a', 1)).unwrap();
        queue.push(entry('b', 2)).unwrap();
        assert!(queue.is_full());

        let rejected = queue.push(entry('c', 3));
        assert!(rejected.is_err());
        assert_eq!(rejected.unwrap_err().message(), "c");

        let stats = queue.stats();
        assert_eq!(stats.push_count, 2);
        assert_eq!(stats.drop_count, 1);
        assert!(stats.drop_rate() > 0.0);
    }

    #[test]
    fn test_stats_snapshot() {
        let queue = EntryQueue::new(10);

        queue.push(entry('a', 1)).unwrap();
        queue.push(entry('b', 2)).unwrap();
        queue.try_pop();

        let stats = queue.stats();
        assert_eq!(stats.push_count, 2);
        assert_eq!(stats.pop_count, 1);
        assert_eq!(stats.depth, 1);
        assert_eq!(stats.fill_percentage(), 10.0);
    }

    #[test]
    fn test_concurrent_pushes() {
        use std::thread;

        let queue = Arc::new(EntryQueue::new(1000));
        let mut handles = vec![];

        for t in 0..10 {
            let q = Arc::clone(&queue);
            handles.push(thread::spawn(move || {
                for i in 0..100 {
                    let _ = q.push(entry('x', (t * 100 + i) as i64));
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let stats = queue.stats();
        assert_eq!(stats.push_count + stats.drop_count, 1000);
    }
}

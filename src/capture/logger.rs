// src/capture/logger.rs
//! Capture units and the observer seam
//!
//! A [`DataLogger`] is one capture unit: it accepts raw events of a single
//! [`LoggerKind`] from the hook thread, renders the human-readable message,
//! and hands the finished [`LogEntry`] to its dispatcher. Everything
//! downstream (composites, file writers, GUI panes) plugs in as a
//! [`LogObserver`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::trace;

use crate::capture::dispatcher::{Dispatcher, DispatcherConfig};
use crate::capture::queue::QueueStats;
use crate::errors::Result;
use crate::event::kinds::key_text;
use crate::event::{KeyPhase, LogEntry, LogEvent};

/// Observer of a logger's entry stream
///
/// Called synchronously by the dispatch worker, one entry at a time, in
/// registration order. Returning an error isolates this observer for that
/// entry; the remaining observers still run.
pub trait LogObserver: Send + Sync {
    /// Handle one dispatched entry
    fn notify_log(&self, entry: &LogEntry) -> Result<()>;
}

/// The closed set of capture-unit kinds, one per event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoggerKind {
    /// Keystrokes in all phases
    Key,
    /// Full button clicks
    MouseClick,
    /// Button presses
    MousePress,
    /// Button releases
    MouseRelease,
    /// Pointer motion
    MouseMove,
    /// Pointer motion with a button held
    MouseDrag,
    /// Scroll wheel turns
    MouseWheel,
}

impl LoggerKind {
    /// Every kind, in directory order
    pub const ALL: [LoggerKind; 7] = [
        LoggerKind::Key,
        LoggerKind::MouseClick,
        LoggerKind::MousePress,
        LoggerKind::MouseRelease,
        LoggerKind::MouseMove,
        LoggerKind::MouseDrag,
        LoggerKind::MouseWheel,
    ];

    /// Human-readable type name of loggers of this kind
    pub fn type_name(&self) -> &'static str {
        match self {
            LoggerKind::Key => "key",
            LoggerKind::MouseClick => "mouse clicked",
            LoggerKind::MousePress => "mouse pressed",
            LoggerKind::MouseRelease => "mouse released",
            LoggerKind::MouseMove => "mouse moved",
            LoggerKind::MouseDrag => "mouse dragged",
            LoggerKind::MouseWheel => "mouse wheel",
        }
    }

    /// Look a kind up by its type name
    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.type_name() == name)
    }

    /// Whether this capture unit handles the given event
    pub fn accepts(&self, event: &LogEvent) -> bool {
        matches!(
            (self, event),
            (LoggerKind::Key, LogEvent::Key { .. })
                | (LoggerKind::MouseClick, LogEvent::MouseClicked { .. })
                | (LoggerKind::MousePress, LogEvent::MousePressed { .. })
                | (LoggerKind::MouseRelease, LogEvent::MouseReleased { .. })
                | (LoggerKind::MouseMove, LogEvent::MouseMoved { .. })
                | (LoggerKind::MouseDrag, LogEvent::MouseDragged { .. })
                | (LoggerKind::MouseWheel, LogEvent::MouseWheelMoved { .. })
        )
    }

    /// Render the log message for an event of this kind
    ///
    /// Key messages carry no trailing newline so consecutive typed
    /// characters concatenate into readable text; mouse messages are
    /// line-terminated.
    pub fn message_for(&self, event: &LogEvent) -> String {
        match *event {
            LogEvent::Key {
                phase: KeyPhase::Typed,
                key_code,
                character,
            } => typed_char_text(key_code, character),
            LogEvent::Key {
                phase,
                key_code,
                character,
            } => format!("{} {}", key_text(key_code, character), phase),
            LogEvent::MouseClicked {
                x,
                y,
                ref button_name,
                clicks,
                ..
            } => {
                if clicks > 1 {
                    format!("Mouse clicked - {button_name} at ({x}, {y}) {clicks} times.\n")
                } else {
                    format!("Mouse clicked - {button_name} at ({x}, {y}).\n")
                }
            }
            LogEvent::MousePressed {
                x,
                y,
                ref button_name,
                ..
            } => format!("Mouse pressed - {button_name} at ({x}, {y}).\n"),
            LogEvent::MouseReleased {
                x,
                y,
                ref button_name,
                ..
            } => format!("Mouse released - {button_name} at ({x}, {y}).\n"),
            LogEvent::MouseMoved { x, y } => format!("Mouse moved - at ({x}, {y}).\n"),
            LogEvent::MouseDragged { x, y, .. } => format!("Mouse dragged - at ({x}, {y}).\n"),
            LogEvent::MouseWheelMoved { x, y, rotation } => {
                let direction = if rotation > 0 { "down" } else { "up" };
                format!(
                    "Mouse wheel moved - at ({x}, {y}) {} units {direction}.\n",
                    rotation.abs()
                )
            }
        }
    }
}

/// Message text for a typed character
fn typed_char_text(key_code: i32, character: char) -> String {
    match character {
        '\n' | '\r' => "[Return]".to_string(),
        '\t' => "[Tab]".to_string(),
        ' ' => "[Space]".to_string(),
        ch if ch.is_alphanumeric() => ch.to_string(),
        _ => format!("[{}]", key_text(key_code, character)),
    }
}

/// One capture unit with a recording gate and an asynchronous dispatcher
pub struct DataLogger {
    /// Which event kind this unit captures
    kind: LoggerKind,

    /// Capture gate; while false, events are discarded before queueing
    recording: AtomicBool,

    /// Bounded queue + background worker delivering to observers
    dispatcher: Dispatcher,
}

impl DataLogger {
    /// Create a logger with default dispatch settings, recording enabled
    pub fn new(kind: LoggerKind) -> Self {
        Self::with_config(kind, DispatcherConfig::default())
    }

    /// Create a logger with explicit dispatch settings
    pub fn with_config(kind: LoggerKind, config: DispatcherConfig) -> Self {
        Self {
            kind,
            recording: AtomicBool::new(true),
            dispatcher: Dispatcher::new(kind.type_name(), config),
        }
    }

    /// Kind of this capture unit
    pub fn kind(&self) -> LoggerKind {
        self.kind
    }

    /// Human-readable type name
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Start the dispatch worker
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) {
        self.dispatcher.start();
    }

    /// Capture one raw event from the hook thread
    ///
    /// Never blocks and never fails toward the caller: events of a
    /// foreign kind are ignored, events behind a closed gate are
    /// discarded, and queue overflow is dropped with accounting.
    pub fn capture(&self, event: LogEvent) {
        if !self.kind.accepts(&event) {
            trace!(kind = self.type_name(), event = event.kind_name(), "ignoring foreign event");
            return;
        }
        if !self.recording.load(Ordering::SeqCst) {
            return;
        }

        let message = self.kind.message_for(&event);
        let entry = LogEntry::new(Some(self.kind), message, event);
        self.dispatcher.submit(entry);
    }

    /// Register an observer; it will see entries after current ones drain
    pub fn add_observer(&self, observer: Arc<dyn LogObserver>) {
        self.dispatcher.add_observer(observer);
    }

    /// Remove an observer by identity
    pub fn remove_observer(&self, observer: &Arc<dyn LogObserver>) {
        self.dispatcher.remove_observer(observer);
    }

    /// Open or close the capture gate
    pub fn set_recording(&self, recording: bool) {
        self.recording.store(recording, Ordering::SeqCst);
    }

    /// Whether the capture gate is open
    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    /// Counters of the dispatch queue
    pub fn queue_stats(&self) -> QueueStats {
        self.dispatcher.queue_stats()
    }

    /// Stop the dispatch worker at its next poll boundary
    ///
    /// Queued entries are not drained.
    pub fn shutdown(&self) {
        self.dispatcher.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::button_name;
    use parking_lot::Mutex;
    use std::time::Duration;

    struct Collecting {
        seen: Mutex<Vec<LogEntry>>,
    }

    impl Collecting {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
            })
        }

        fn messages(&self) -> Vec<String> {
            self.seen.lock().iter().map(|e| e.message().to_string()).collect()
        }
    }

    impl LogObserver for Collecting {
        fn notify_log(&self, entry: &LogEntry) -> Result<()> {
            self.seen.lock().push(entry.clone());
            Ok(())
        }
    }

    fn typed(ch: char) -> LogEvent {
        LogEvent::Key {
            phase: KeyPhase::Typed,
            key_code: 0,
            character: ch,
        }
    }

    async fn settle(condition: impl Fn() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("dispatch did not settle in time");
    }

    #[test]
    fn test_type_names_round_trip() {
        for kind in LoggerKind::ALL {
            assert_eq!(LoggerKind::from_type_name(kind.type_name()), Some(kind));
        }
        assert_eq!(LoggerKind::from_type_name("teletype"), None);
    }

    #[test]
    fn test_accepts_matches_kind() {
        assert!(LoggerKind::Key.accepts(&typed('a')));
        assert!(!LoggerKind::MouseMove.accepts(&typed('a')));
        assert!(LoggerKind::MouseMove.accepts(&LogEvent::MouseMoved { x: 0, y: 0 }));
    }

    #[test]
    fn test_typed_messages() {
        let kind = LoggerKind::Key;
        assert_eq!(kind.message_for(&typed('a')), "a");
        assert_eq!(kind.message_for(&typed('\n')), "[Return]");
        assert_eq!(kind.message_for(&typed('\t')), "[Tab]");
        assert_eq!(kind.message_for(&typed(' ')), "[Space]");
        assert_eq!(kind.message_for(&typed('.')), "[.]");
    }

    #[test]
    fn test_pressed_released_messages() {
        let pressed = LogEvent::Key {
            phase: KeyPhase::Pressed,
            key_code: 30,
            character: 'a',
        };
        assert_eq!(LoggerKind::Key.message_for(&pressed), "a pressed");

        let released = LogEvent::Key {
            phase: KeyPhase::Released,
            key_code: 28,
            character: '\n',
        };
        assert_eq!(LoggerKind::Key.message_for(&released), "key 28 released");
    }

    #[test]
    fn test_mouse_messages() {
        let clicked = LogEvent::MouseClicked {
            x: 5,
            y: 6,
            button: 1,
            button_name: button_name(1),
            clicks: 1,
        };
        assert_eq!(
            LoggerKind::MouseClick.message_for(&clicked),
            "Mouse clicked - left at (5, 6).\n"
        );

        let double = LogEvent::MouseClicked {
            x: 5,
            y: 6,
            button: 1,
            button_name: button_name(1),
            clicks: 2,
        };
        assert_eq!(
            LoggerKind::MouseClick.message_for(&double),
            "Mouse clicked - left at (5, 6) 2 times.\n"
        );

        let wheel = LogEvent::MouseWheelMoved {
            x: 1,
            y: 2,
            rotation: -4,
        };
        assert_eq!(
            LoggerKind::MouseWheel.message_for(&wheel),
            "Mouse wheel moved - at (1, 2) 4 units up.\n"
        );
    }

    #[tokio::test]
    async fn test_capture_reaches_observers_in_order() {
        let logger = DataLogger::new(LoggerKind::Key);
        let observer = Collecting::new();
        logger.add_observer(observer.clone());
        logger.start();

        for ch in ['a', 'b', 'c'] {
            logger.capture(typed(ch));
        }

        settle(|| observer.seen.lock().len() == 3).await;
        assert_eq!(observer.messages(), vec!["a", "b", "c"]);

        logger.shutdown();
    }

    #[tokio::test]
    async fn test_recording_gate_discards() {
        let logger = DataLogger::new(LoggerKind::Key);
        let observer = Collecting::new();
        logger.add_observer(observer.clone());
        logger.start();

        assert!(logger.is_recording());
        logger.set_recording(false);
        logger.capture(typed('x'));

        logger.set_recording(true);
        logger.capture(typed('y'));

        settle(|| !observer.seen.lock().is_empty()).await;
        assert_eq!(observer.messages(), vec!["y"]);
        assert_eq!(logger.queue_stats().push_count, 1);

        logger.shutdown();
    }

    #[tokio::test]
    async fn test_foreign_events_ignored() {
        let logger = DataLogger::new(LoggerKind::MouseMove);
        let observer = Collecting::new();
        logger.add_observer(observer.clone());
        logger.start();

        logger.capture(typed('a'));
        logger.capture(LogEvent::MouseMoved { x: 1, y: 1 });

        settle(|| !observer.seen.lock().is_empty()).await;
        assert_eq!(observer.messages(), vec!["Mouse moved - at (1, 1).\n"]);

        logger.shutdown();
    }
}

// src/event/kinds.rs
//! Captured input event payloads
//!
//! [`LogEvent`] is the closed set of event kinds the pipeline understands.
//! Every variant is immutable after construction and carries exactly the
//! fields its wire encoding persists; shared mouse coordinates are exposed
//! through [`LogEvent::position`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{Error, Result};

/// Phase of a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyPhase {
    /// Key went down
    Pressed,
    /// Key came up
    Released,
    /// Key produced a character
    Typed,
}

impl KeyPhase {
    /// Canonical wire name of the phase
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyPhase::Pressed => "pressed",
            KeyPhase::Released => "released",
            KeyPhase::Typed => "typed",
        }
    }

    /// Parse a wire name back into a phase
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "pressed" => Ok(KeyPhase::Pressed),
            "released" => Ok(KeyPhase::Released),
            "typed" => Ok(KeyPhase::Typed),
            other => Err(Error::UnknownKeyPhase(other.to_string())),
        }
    }
}

impl fmt::Display for KeyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One captured input event
///
/// The `kind` tag used on the wire matches [`LogEvent::kind_name`]:
/// `KeyEvent`, `MouseClicked`, `MousePressed`, `MouseReleased`,
/// `MouseMoved`, `MouseDragged`, `MouseWheelMoved`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum LogEvent {
    /// A key pressed, released or typed
    #[serde(rename = "KeyEvent")]
    Key {
        /// Which phase of the keystroke this is
        phase: KeyPhase,
        /// Platform-defined key code; `<= 0` means no synthesizable code
        /// was captured (typical for typed-only characters)
        key_code: i32,
        /// Character produced, if any
        character: char,
    },

    /// A full button click (press and release at one position)
    MouseClicked {
        x: i32,
        y: i32,
        /// Button code, see [`button_name`]
        button: i32,
        /// Human-readable button name as captured
        button_name: String,
        /// Consecutive click count (1 for a single click)
        clicks: i32,
    },

    /// A button went down
    MousePressed {
        x: i32,
        y: i32,
        button: i32,
        button_name: String,
    },

    /// A button came up
    MouseReleased {
        x: i32,
        y: i32,
        button: i32,
        button_name: String,
    },

    /// The pointer moved with no button held
    MouseMoved { x: i32, y: i32 },

    /// The pointer moved while a button was held
    MouseDragged { x: i32, y: i32, button: i32 },

    /// The scroll wheel turned; positive rotation scrolls down
    MouseWheelMoved { x: i32, y: i32, rotation: i32 },
}

impl LogEvent {
    /// Wire name of this event's kind
    pub fn kind_name(&self) -> &'static str {
        match self {
            LogEvent::Key { .. } => "KeyEvent",
            LogEvent::MouseClicked { .. } => "MouseClicked",
            LogEvent::MousePressed { .. } => "MousePressed",
            LogEvent::MouseReleased { .. } => "MouseReleased",
            LogEvent::MouseMoved { .. } => "MouseMoved",
            LogEvent::MouseDragged { .. } => "MouseDragged",
            LogEvent::MouseWheelMoved { .. } => "MouseWheelMoved",
        }
    }

    /// Screen position for mouse kinds, `None` for key events
    pub fn position(&self) -> Option<(i32, i32)> {
        match *self {
            LogEvent::Key { .. } => None,
            LogEvent::MouseClicked { x, y, .. }
            | LogEvent::MousePressed { x, y, .. }
            | LogEvent::MouseReleased { x, y, .. }
            | LogEvent::MouseMoved { x, y }
            | LogEvent::MouseDragged { x, y, .. }
            | LogEvent::MouseWheelMoved { x, y, .. } => Some((x, y)),
        }
    }

    /// Whether this is a key kind
    pub fn is_key(&self) -> bool {
        matches!(self, LogEvent::Key { .. })
    }
}

/// Human-readable name for a mouse button code
///
/// Codes 0 through 5 have fixed names; anything else renders as its
/// decimal code.
pub fn button_name(button: i32) -> String {
    match button {
        0 => "no button".to_string(),
        1 => "left".to_string(),
        2 => "right".to_string(),
        3 => "middle".to_string(),
        4 => "button 4".to_string(),
        5 => "button 5".to_string(),
        other => other.to_string(),
    }
}

/// Display text for a key, used in log messages
///
/// Key codes are platform-defined, so no code table is kept here: the
/// character is shown when it is printable, otherwise the numeric code.
pub(crate) fn key_text(key_code: i32, character: char) -> String {
    if character != '\0' && !character.is_control() && !character.is_whitespace() {
        character.to_string()
    } else {
        format!("key {}", key_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_names_round_trip() {
        for phase in [KeyPhase::Pressed, KeyPhase::Released, KeyPhase::Typed] {
            assert_eq!(KeyPhase::parse(phase.as_str()).unwrap(), phase);
        }
    }

    #[test]
    fn test_unknown_phase_rejected() {
        let err = KeyPhase::parse("held").unwrap_err();
        assert!(matches!(err, Error::UnknownKeyPhase(name) if name == "held"));
    }

    #[test]
    fn test_kind_names() {
        let event = LogEvent::Key {
            phase: KeyPhase::Typed,
            key_code: 30,
            character: 'a',
        };
        assert_eq!(event.kind_name(), "KeyEvent");

        let event = LogEvent::MouseWheelMoved {
            x: 10,
            y: 20,
            rotation: -3,
        };
        assert_eq!(event.kind_name(), "MouseWheelMoved");
    }

    #[test]
    fn test_position_only_for_mouse_kinds() {
        let key = LogEvent::Key {
            phase: KeyPhase::Pressed,
            key_code: 1,
            character: '\0',
        };
        assert_eq!(key.position(), None);

        let moved = LogEvent::MouseMoved { x: 3, y: 4 };
        assert_eq!(moved.position(), Some((3, 4)));
    }

    #[test]
    fn test_button_names() {
        assert_eq!(button_name(0), "no button");
        assert_eq!(button_name(1), "left");
        assert_eq!(button_name(2), "right");
        assert_eq!(button_name(3), "middle");
        assert_eq!(button_name(4), "button 4");
        assert_eq!(button_name(5), "button 5");
        assert_eq!(button_name(9), "9");
    }

    #[test]
    fn test_key_text_prefers_printable_character() {
        assert_eq!(key_text(30, 'a'), "a");
        assert_eq!(key_text(12, '.'), ".");
        assert_eq!(key_text(28, '\n'), "key 28");
        assert_eq!(key_text(42, '\0'), "key 42");
    }

    #[test]
    fn test_json_kind_tag() {
        let event = LogEvent::MouseClicked {
            x: 1,
            y: 2,
            button: 1,
            button_name: button_name(1),
            clicks: 2,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"kind\":\"MouseClicked\""));

        let back: LogEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}

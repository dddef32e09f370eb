// src/replay/injector.rs
//! The seam between replay and the platform
//!
//! The engine only ever talks to an [`InputInjector`]; wiring one up to a
//! real display server lives outside this crate. Acquisition goes through
//! an [`InjectorProvider`] so that environments without injection support
//! (headless machines, denied permissions) fail before any replay starts.

use crate::errors::Result;

/// Synthesizes input on the machine running the replay
///
/// Calls arrive from a single replay worker, one at a time. Implementors
/// may block; pacing is the engine's job.
pub trait InputInjector: Send {
    /// Warp the pointer to absolute screen coordinates
    fn move_mouse(&mut self, x: i32, y: i32) -> Result<()>;

    /// Press a mouse button by recorded button code
    fn press_button(&mut self, button: i32) -> Result<()>;

    /// Release a mouse button by recorded button code
    fn release_button(&mut self, button: i32) -> Result<()>;

    /// Press a key by recorded key code
    fn press_key(&mut self, key_code: i32) -> Result<()>;

    /// Release a key by recorded key code
    fn release_key(&mut self, key_code: i32) -> Result<()>;

    /// Turn the scroll wheel; positive rotation scrolls down
    fn scroll_wheel(&mut self, rotation: i32) -> Result<()>;

    /// Block until previously injected input has been processed
    fn wait_idle(&mut self) -> Result<()>;
}

/// Hands out injectors, failing where injection is unavailable
pub trait InjectorProvider: Send + Sync {
    /// Acquire an injector for one replay run
    fn acquire(&self) -> Result<Box<dyn InputInjector>>;
}

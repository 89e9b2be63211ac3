//! Core event types and channel helpers for the REPL runtime.
//!
//! The input task decodes raw terminal bytes into [`KeyEvent`]s and forwards
//! them as [`Event`]s over a bounded channel to the single session loop.

use std::sync::atomic::AtomicU64;

// -------------------------------------------------------------------------------------------------
// Channel Policy
// -------------------------------------------------------------------------------------------------
// One producer (the input task) and one consumer (the session loop). The channel is bounded so a
// stalled evaluation applies backpressure to the reader instead of buffering unbounded keystrokes;
// the input task awaits `send` rather than dropping events.
// -------------------------------------------------------------------------------------------------
pub const EVENT_CHANNEL_CAP: usize = 1024;

// -------------------------------------------------------------------------------------------------
// Telemetry
// -------------------------------------------------------------------------------------------------
// Relaxed atomic counters, inspected in tests and logged on shutdown.
// -------------------------------------------------------------------------------------------------
pub static CHANNEL_SEND_FAILURES: AtomicU64 = AtomicU64::new(0);
pub static KEYS_DECODED: AtomicU64 = AtomicU64::new(0);
pub static KEYS_IGNORED: AtomicU64 = AtomicU64::new(0);
pub static INPUT_BYTES: AtomicU64 = AtomicU64::new(0);
pub static ASYNC_INPUT_STARTS: AtomicU64 = AtomicU64::new(0);
pub static ASYNC_INPUT_STOP_SIGNAL: AtomicU64 = AtomicU64::new(0);
pub static ASYNC_INPUT_STOP_CHANNEL: AtomicU64 = AtomicU64::new(0);
pub static ASYNC_INPUT_STOP_STREAM: AtomicU64 = AtomicU64::new(0);
pub static ASYNC_INPUT_STOP_ERROR: AtomicU64 = AtomicU64::new(0);

/// Top-level event enum consumed by the session loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// The input source ended or was told to stop. Treated like end of input.
    Shutdown,
}

/// Semantic key produced by the decoder.
///
/// Produced per decoded input chunk and never retained by the session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyEvent {
    /// One or more printable characters, in the order they were typed.
    Character(String),
    Backspace,
    Enter,
    Up,
    Down,
    Left,
    Right,
    /// Ctrl+C.
    Interrupt,
    /// Ctrl+D.
    EndOfInput,
    /// Recognized but unhandled key (function keys, Home/End, paging, Tab, ...).
    Ignored,
}

impl KeyEvent {
    /// Stable label used in structured logs. Never includes typed content.
    pub fn kind_label(&self) -> &'static str {
        match self {
            KeyEvent::Character(_) => "character",
            KeyEvent::Backspace => "backspace",
            KeyEvent::Enter => "enter",
            KeyEvent::Up => "up",
            KeyEvent::Down => "down",
            KeyEvent::Left => "left",
            KeyEvent::Right => "right",
            KeyEvent::Interrupt => "interrupt",
            KeyEvent::EndOfInput => "end_of_input",
            KeyEvent::Ignored => "ignored",
        }
    }

    /// True for keys that end the session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, KeyEvent::Interrupt | KeyEvent::EndOfInput)
    }
}

impl From<KeyEvent> for Event {
    fn from(key: KeyEvent) -> Self {
        Event::Key(key)
    }
}

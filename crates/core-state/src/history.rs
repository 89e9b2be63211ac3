//! Append-only history with an Up/Down browsing cursor.
//!
//! The cursor is a non-positive offset from the end: `0` means the user is
//! editing a fresh line, `-1` is the most recent entry, `-len` the oldest.
//! Entries are never mutated or reordered.

use std::path::Path;

use crate::transcript::{LineEnding, TranscriptError, write_transcript};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<String>,
    cursor: isize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a submitted line (empty strings included) and stop browsing.
    pub fn push(&mut self, line: impl Into<String>) {
        self.entries.push(line.into());
        self.cursor = 0;
    }

    /// Step one entry back in time.
    ///
    /// Ignored when a fresh, non-empty line is being edited so Up never
    /// discards typed text. Returns the entry to load into the buffer.
    pub fn recall_previous(&mut self, live_buffer_empty: bool) -> Option<&str> {
        if self.cursor == 0 && !live_buffer_empty {
            return None;
        }
        let len = self.entries.len() as isize;
        if len == 0 || self.cursor <= -len {
            return None;
        }
        self.cursor -= 1;
        tracing::trace!(target: "state.history", cursor = self.cursor, "recall_previous");
        self.get(self.cursor)
    }

    /// Step one entry forward. Reaching the fresh line yields `""`.
    pub fn recall_next(&mut self) -> Option<&str> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor += 1;
        tracing::trace!(target: "state.history", cursor = self.cursor, "recall_next");
        if self.cursor == 0 {
            return Some("");
        }
        self.get(self.cursor)
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index from the front when non-negative, from the back when negative.
    pub fn get(&self, index: isize) -> Option<&str> {
        let idx = if index < 0 {
            self.entries.len().checked_sub(index.unsigned_abs())?
        } else {
            index as usize
        };
        self.entries.get(idx).map(String::as_str)
    }

    /// Entries joined with the host line terminator.
    pub fn to_transcript(&self) -> String {
        self.entries.join(LineEnding::native().as_str())
    }

    pub fn save_transcript(&self, path: &Path) -> Result<(), TranscriptError> {
        write_transcript(path, &self.to_transcript())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn filled(lines: &[&str]) -> History {
        let mut h = History::new();
        for l in lines {
            h.push(*l);
        }
        h
    }

    #[test]
    fn recall_on_empty_history_is_noop() {
        let mut h = History::new();
        assert_eq!(h.recall_previous(true), None);
        assert_eq!(h.cursor(), 0);
        assert_eq!(h.recall_next(), None);
        assert_eq!(h.cursor(), 0);
    }

    #[test]
    fn recall_ignored_while_editing_fresh_text() {
        let mut h = filled(&["a"]);
        assert_eq!(h.recall_previous(false), None);
        assert_eq!(h.cursor(), 0);
    }

    #[test]
    fn browsing_continues_once_started() {
        let mut h = filled(&["a", "b"]);
        assert_eq!(h.recall_previous(true), Some("b"));
        // The recalled entry now fills the buffer; browsing keeps going.
        assert_eq!(h.recall_previous(false), Some("a"));
        assert_eq!(h.recall_previous(false), None);
        assert_eq!(h.cursor(), -2);
    }

    #[test]
    fn recall_next_returns_to_fresh_line() {
        let mut h = filled(&["a", "b"]);
        h.recall_previous(true);
        h.recall_previous(false);
        assert_eq!(h.recall_next(), Some("b"));
        assert_eq!(h.recall_next(), Some(""));
        assert_eq!(h.cursor(), 0);
        assert_eq!(h.recall_next(), None);
    }

    #[test]
    fn push_resets_cursor_and_keeps_empty_lines() {
        let mut h = filled(&["a"]);
        h.recall_previous(true);
        h.push("");
        assert_eq!(h.cursor(), 0);
        assert_eq!(h.entries(), &["a".to_string(), String::new()]);
    }

    #[test]
    fn get_accepts_negative_offsets() {
        let h = filled(&["x", "y", "z"]);
        assert_eq!(h.get(0), Some("x"));
        assert_eq!(h.get(-1), Some("z"));
        assert_eq!(h.get(-3), Some("x"));
        assert_eq!(h.get(-4), None);
        assert_eq!(h.get(3), None);
    }

    #[test]
    fn transcript_uses_native_line_ending() {
        let h = filled(&["1+1", "2+2"]);
        let eol = LineEnding::native().as_str();
        assert_eq!(h.to_transcript(), format!("1+1{eol}2+2"));
    }

    proptest! {
        #[test]
        fn walk_back_then_forward_one(
            entries in proptest::collection::vec("[a-z0-9+ ]{0,8}", 2..12)
        ) {
            let mut h = History::new();
            for e in &entries {
                h.push(e.clone());
            }
            let mut last = None;
            for _ in 0..entries.len() {
                last = h.recall_previous(true).map(str::to_string);
            }
            prop_assert_eq!(last.as_deref(), Some(entries[0].as_str()));
            prop_assert_eq!(h.recall_next(), Some(entries[1].as_str()));
        }
    }
}

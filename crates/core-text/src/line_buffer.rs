//! Editable single-line buffer with a grapheme cursor.
//!
//! Invariant: `0 <= cursor <= clusters.len()`. The cursor counts clusters, not
//! bytes or columns; [`LineSnapshot`] derives the other two views on demand.

use crate::segment::normalize_and_segment;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Cluster {
    text: String,
    width: u16,
}

/// The line being edited at the prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    clusters: Vec<Cluster>,
    cursor: usize,
}

/// Immutable view handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSnapshot {
    pub content: String,
    /// Cursor position in clusters.
    pub cursor: usize,
    /// Display column of the cursor relative to the start of the content.
    pub cursor_col: usize,
    /// Total display width of the content.
    pub width: usize,
    /// Byte offset of the cursor inside `content`.
    pub cursor_byte: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the cursor and advance past the inserted clusters.
    pub fn insert(&mut self, text: &str) -> usize {
        self.insert_at(self.cursor, text)
    }

    /// Insert at cluster index `pos`. Out-of-range positions are ignored.
    ///
    /// When `pos <= cursor` the cursor shifts right so it keeps pointing at the
    /// same cluster. Returns the number of clusters inserted.
    pub fn insert_at(&mut self, pos: usize, text: &str) -> usize {
        if pos > self.clusters.len() || text.is_empty() {
            return 0;
        }
        let (_normalized, segments) = normalize_and_segment(text);
        let count = segments.len();
        self.clusters.splice(
            pos..pos,
            segments.into_iter().map(|s| Cluster {
                text: s.cluster,
                width: s.width,
            }),
        );
        if pos <= self.cursor {
            self.cursor += count;
        }
        count
    }

    /// Remove the cluster before the cursor. Returns false at column 0.
    pub fn delete_before(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.clusters.remove(self.cursor);
        true
    }

    /// Move one cluster left, returning the width crossed.
    pub fn move_left(&mut self) -> Option<u16> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.clusters[self.cursor].width)
    }

    /// Move one cluster right, returning the width crossed.
    pub fn move_right(&mut self) -> Option<u16> {
        let crossed = self.clusters.get(self.cursor)?.width;
        self.cursor += 1;
        Some(crossed)
    }

    pub fn clear(&mut self) {
        self.clusters.clear();
        self.cursor = 0;
    }

    /// Load `text` wholesale with the cursor at the end (history recall).
    pub fn replace(&mut self, text: &str) {
        self.clear();
        self.insert(text);
    }

    pub fn text(&self) -> String {
        self.clusters.iter().map(|c| c.text.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// True when the content is empty or only whitespace.
    pub fn is_blank(&self) -> bool {
        self.clusters
            .iter()
            .all(|c| c.text.chars().all(char::is_whitespace))
    }

    pub fn snapshot(&self) -> LineSnapshot {
        let (before, after) = self.clusters.split_at(self.cursor);
        let cursor_col: usize = before.iter().map(|c| usize::from(c.width)).sum();
        let cursor_byte: usize = before.iter().map(|c| c.text.len()).sum();
        let width = cursor_col + after.iter().map(|c| usize::from(c.width)).sum::<usize>();
        LineSnapshot {
            content: self.text(),
            cursor: self.cursor,
            cursor_col,
            width,
            cursor_byte,
        }
    }
}

//! Single-row prompt renderer.
//!
//! Translates `(prompt, LineSnapshot)` into the escape sequences that repaint
//! the current terminal row and park the cursor at the caret. Other rows are
//! never touched and no alternate screen is used.
//!
//! Sequences emitted:
//! - redraw: column 0, erase to end of line, `prompt + content`, absolute
//!   column `width(prompt) + cursor_col`.
//! - cursor movement: relative forward/backward by the display width crossed.
//! - line break: `\r\n`, since raw mode disables LF translation.

pub mod metrics;
pub mod writer;

use anyhow::Result;
use core_text::{LineSnapshot, normalize_and_segment};
use std::io::Write;

pub use metrics::{RenderMetrics, RenderMetricsSnapshot};
pub use writer::{Command, Writer};

const LINE_BREAK: &str = "\r\n";
/// Highest 0-based column crossterm can address (`CSI n G` is 1-based).
const MAX_COLUMN: u16 = u16::MAX - 1;

/// Display width of a prompt string in terminal cells.
pub fn prompt_width(prompt: &str) -> usize {
    let (_n, segs) = normalize_and_segment(prompt);
    segs.iter().map(|s| usize::from(s.width)).sum()
}

/// Owns the output sink for the lifetime of a session.
pub struct Renderer<W: Write> {
    out: W,
    metrics: RenderMetrics,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            metrics: RenderMetrics::default(),
        }
    }

    /// Repaint the prompt row from scratch.
    pub fn redraw(&mut self, prompt: &str, snap: &LineSnapshot) -> Result<()> {
        let mut w = Writer::new();
        w.move_to_column(0);
        w.clear_to_eol();
        w.print(format!("{prompt}{}", snap.content));
        let column = prompt_width(prompt).saturating_add(snap.cursor_col);
        w.move_to_column(u16::try_from(column).map_or(MAX_COLUMN, |c| c.min(MAX_COLUMN)));
        RenderMetrics::bump(&self.metrics.redraws);
        tracing::trace!(
            target: "render",
            width = snap.width,
            cursor_col = snap.cursor_col,
            "redraw"
        );
        w.flush_into(&mut self.out)
    }

    /// Move the terminal cursor horizontally without repainting.
    /// Positive deltas move right.
    pub fn move_cursor(&mut self, delta: i32) -> Result<()> {
        if delta == 0 {
            return Ok(());
        }
        let mut w = Writer::new();
        let n = u16::try_from(delta.unsigned_abs()).unwrap_or(u16::MAX);
        if delta > 0 {
            w.move_right(n);
        } else {
            w.move_left(n);
        }
        RenderMetrics::bump(&self.metrics.cursor_moves);
        w.flush_into(&mut self.out)
    }

    pub fn line_break(&mut self) -> Result<()> {
        let mut w = Writer::new();
        w.print(LINE_BREAK);
        RenderMetrics::bump(&self.metrics.line_breaks);
        w.flush_into(&mut self.out)
    }

    /// Print a result block followed by a line break. Embedded newlines are
    /// expanded to `\r\n` so multi-line values start at column 0.
    pub fn print_block(&mut self, text: &str) -> Result<()> {
        let mut w = Writer::new();
        let body = text.replace("\r\n", "\n").replace('\n', LINE_BREAK);
        w.print(body);
        w.print(LINE_BREAK);
        RenderMetrics::bump(&self.metrics.blocks_printed);
        w.flush_into(&mut self.out)
    }

    /// End-of-session cleanup: leave the shell on a fresh row when the user
    /// quit with the prompt still showing.
    pub fn finish(&mut self, mid_edit: bool) -> Result<()> {
        if mid_edit {
            self.line_break()?;
        }
        self.out.flush()?;
        let m = self.metrics.snapshot();
        tracing::debug!(
            target: "render",
            redraws = m.redraws,
            cursor_moves = m.cursor_moves,
            line_breaks = m.line_breaks,
            blocks = m.blocks_printed,
            "render_finished"
        );
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn metrics(&self) -> RenderMetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

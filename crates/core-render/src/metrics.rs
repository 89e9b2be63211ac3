//! Render counters, recorded per emitted operation and logged on shutdown.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct RenderMetrics {
    pub redraws: AtomicU64,
    pub cursor_moves: AtomicU64,
    pub line_breaks: AtomicU64,
    pub blocks_printed: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderMetricsSnapshot {
    pub redraws: u64,
    pub cursor_moves: u64,
    pub line_breaks: u64,
    pub blocks_printed: u64,
}

impl RenderMetrics {
    pub fn snapshot(&self) -> RenderMetricsSnapshot {
        RenderMetricsSnapshot {
            redraws: self.redraws.load(Ordering::Relaxed),
            cursor_moves: self.cursor_moves.load(Ordering::Relaxed),
            line_breaks: self.line_breaks.load(Ordering::Relaxed),
            blocks_printed: self.blocks_printed.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

//! Grapheme-aware text primitives for the prompt line.
//!
//! All cursor arithmetic is expressed in grapheme clusters; byte offsets and
//! screen columns are derived from the cluster list so the three never drift.

pub mod line_buffer;
pub mod segment;
mod width;

pub use line_buffer::{LineBuffer, LineSnapshot};
pub use segment::{Segment, normalize_and_segment};
pub use width::egc_width;

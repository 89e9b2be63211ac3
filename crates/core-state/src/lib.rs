//! Session state that outlives a single input cycle: submitted-line history
//! with its browsing cursor, and the transcript file format used by `.save`
//! and `.load`.

pub mod history;
pub mod transcript;

pub use history::History;
pub use transcript::{LineEnding, TranscriptError, read_transcript};

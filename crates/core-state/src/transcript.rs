//! Transcript file format: plain text, one submitted line per row, host line
//! terminator between rows and no trailing metadata.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    Crlf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
        }
    }

    /// The convention of the platform we were built for.
    pub fn native() -> Self {
        if cfg!(windows) {
            LineEnding::Crlf
        } else {
            LineEnding::Lf
        }
    }
}

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("failed to write transcript {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read transcript {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn write_transcript(path: &Path, content: &str) -> Result<(), TranscriptError> {
    std::fs::write(path, content.as_bytes()).map_err(|source| {
        tracing::error!(target: "io", error = %source, "transcript_write_error");
        TranscriptError::Write {
            path: path.to_path_buf(),
            source,
        }
    })?;
    tracing::info!(target: "io", bytes = content.len(), "transcript_saved");
    Ok(())
}

/// Read a transcript back as its lines. Both `\n` and `\r\n` separators are
/// accepted; a final terminator does not produce an extra empty line.
pub fn read_transcript(path: &Path) -> Result<Vec<String>, TranscriptError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        tracing::error!(target: "io", error = %source, "transcript_read_error");
        TranscriptError::Read {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let lines: Vec<String> = content.lines().map(str::to_string).collect();
    tracing::info!(target: "io", lines = lines.len(), "transcript_loaded");
    Ok(lines)
}

//! Training trace loader.
//!
//! A trace is a JSON-lines file, one [`TrainEvent`] per line. Blank lines and lines
//! starting with `#` are ignored. Omitted fields take their defaults, so the shortest
//! valid line is `{"addr": 4096}`.

use std::fs;
use std::path::Path;

use crate::common::error::TraceError;
use crate::prefetch::types::TrainEvent;

/// Parses trace text.
///
/// # Errors
///
/// Returns [`TraceError::Parse`] with the 1-based line number of the first bad line.
pub fn parse_trace(text: &str) -> Result<Vec<TrainEvent>, TraceError> {
    let mut events = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str(line)
            .map_err(|source| TraceError::Parse { line: idx + 1, source })?;
        events.push(event);
    }
    Ok(events)
}

/// Reads and parses a trace file.
///
/// # Errors
///
/// Returns [`TraceError::Io`] if the file cannot be read and [`TraceError::Parse`] for a
/// malformed line.
pub fn load_trace(path: impl AsRef<Path>) -> Result<Vec<TrainEvent>, TraceError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| TraceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let events = parse_trace(&text)?;
    tracing::info!(path = %path.display(), events = events.len(), "trace loaded");
    Ok(events)
}

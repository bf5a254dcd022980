// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

// Resize event log
//
// The capture process writes one JSON object per line describing each
// terminal resize, tagged with the raw-stream byte offset at which it
// applies. Readers must tolerate arbitrary garbage: the log may be appended
// concurrently with reading, so a torn or malformed line is noise to skip,
// never a fatal error.

use serde::Deserialize;
use tracing::trace;

/// One terminal resize, positioned in the raw output stream.
///
/// The ordering key is `(stream_offset, t_ns)`: offset is primary because
/// playback interleaves events by byte position, time breaks ties between
/// events sharing an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeEvent {
    /// Elapsed nanoseconds since capture start
    pub t_ns: u64,
    /// Raw output-stream byte offset at which the resize applies
    pub stream_offset: u64,
    /// Terminal columns after the resize
    pub cols: u32,
    /// Terminal rows after the resize
    pub rows: u32,
}

/// Outcome of validating a single event-log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRecord {
    /// The line carried a well-formed output-stream resize event
    Valid(ResizeEvent),
    /// The line was empty, malformed, of another type, or for another stream
    Skipped,
}

/// Wire shape of a resize line. Extra fields are tolerated; missing or
/// mistyped ones (negative numbers, floats, strings where integers belong)
/// fail deserialization and the line is skipped.
#[derive(Debug, Deserialize)]
struct ResizeLine {
    #[serde(rename = "type")]
    kind: String,
    t_ns: u64,
    stream: String,
    stream_offset: u64,
    cols: u32,
    rows: u32,
}

/// Validate one event-log line.
///
/// Only `"type":"resize"` records for the `"output"` stream become events;
/// other types and stream tags are opaque to playback and skipped.
pub fn parse_line(line: &str) -> LineRecord {
    let line = line.trim();
    if line.is_empty() {
        return LineRecord::Skipped;
    }

    let parsed: ResizeLine = match serde_json::from_str(line) {
        Ok(p) => p,
        Err(e) => {
            trace!(error = %e, "skipping unparseable event-log line");
            return LineRecord::Skipped;
        }
    };

    if parsed.kind != "resize" || parsed.stream != "output" {
        return LineRecord::Skipped;
    }

    LineRecord::Valid(ResizeEvent {
        t_ns: parsed.t_ns,
        stream_offset: parsed.stream_offset,
        cols: parsed.cols,
        rows: parsed.rows,
    })
}

/// Parse a whole event log and return its resize events in canonical order.
///
/// Each non-empty line is parsed independently; lines that fail are dropped
/// silently. The result is stable-sorted ascending by
/// `(stream_offset, t_ns)`, so events that compare equal keep their
/// original relative order.
pub fn normalize_resize_events(text: &str) -> Vec<ResizeEvent> {
    let mut events: Vec<ResizeEvent> = text
        .lines()
        .filter_map(|line| match parse_line(line) {
            LineRecord::Valid(event) => Some(event),
            LineRecord::Skipped => None,
        })
        .collect();

    events.sort_by_key(|e| (e.stream_offset, e.t_ns));
    events
}

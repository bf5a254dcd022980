// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Session reader
//!
//! Ties the three files a capture process leaves behind — raw output
//! stream, TIDX index, resize event log — into one queryable unit. Opening
//! a session always runs the decode-then-repair pipeline: the index and the
//! raw file grow independently, so the index is trusted only after it has
//! been trimmed to the bytes that actually exist.
//!
//! File naming and discovery stay with the caller; `open` takes three
//! explicit paths. For a still-live capture, re-open between seeks to pick
//! up newly appended data.

use std::fs;
use std::path::Path;

use tracing::debug;

use tc_events::{normalize_resize_events, ResizeEvent};
use tc_timeindex::{
    decode_tidx, offset_at_time_ns, time_at_offset_ns, truncate_to_raw_len, DecodeOptions,
    TidxIndex,
};

use crate::error::{Error, Result};
use crate::segment::{last_resize_before_offset, segment_output_by_resize_events, SegmentIter};

/// One fully loaded capture session
pub struct Session {
    raw: Vec<u8>,
    index: TidxIndex,
    events: Vec<ResizeEvent>,
}

impl Session {
    /// Open a session from its raw stream, TIDX, and event-log files.
    ///
    /// The index is decoded with `allow_trailing_partial` set (a killed
    /// capture may leave a torn final record) and then repaired against the
    /// observed raw length, so every offset it answers with is backed by
    /// data. The event log is normalized into canonical order; an empty or
    /// garbage-only log yields an empty event list.
    pub fn open<P: AsRef<Path>>(raw_path: P, tidx_path: P, events_path: P) -> Result<Self> {
        let raw = fs::read(raw_path.as_ref())?;
        let tidx_bytes = fs::read(tidx_path.as_ref())?;
        let events_text = fs::read_to_string(events_path.as_ref())?;

        let decoded = decode_tidx(
            &tidx_bytes,
            DecodeOptions {
                allow_trailing_partial: true,
            },
        )?;
        let index = truncate_to_raw_len(&decoded, raw.len() as u64);
        let events = normalize_resize_events(&events_text);

        debug!(
            raw_len = raw.len(),
            decoded_records = decoded.len(),
            repaired_records = index.len(),
            events = events.len(),
            "opened capture session"
        );

        Ok(Self { raw, index, events })
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// The repaired index
    pub fn index(&self) -> &TidxIndex {
        &self.index
    }

    /// Normalized output-stream resize events
    pub fn events(&self) -> &[ResizeEvent] {
        &self.events
    }

    /// Elapsed nanoseconds covered by the repaired index
    pub fn duration_ns(&self) -> u64 {
        self.index.duration_ns()
    }

    pub fn offset_at_time_ns(&self, t: u64) -> u64 {
        offset_at_time_ns(&self.index, t)
    }

    pub fn time_at_offset_ns(&self, offset: u64) -> u64 {
        time_at_offset_ns(&self.index, offset)
    }

    /// Terminal geometry in effect just before `offset`, if any resize
    /// precedes it.
    pub fn geometry_at_offset(&self, offset: u64) -> Option<(u32, u32)> {
        last_resize_before_offset(&self.events, offset).map(|e| (e.cols, e.rows))
    }

    /// Playback segments for the byte range `[start, end)`, clamped to the
    /// range the repaired index vouches for.
    pub fn segments_between_offsets(&self, start: u64, end: u64) -> Result<SegmentIter<'_>> {
        if start > end {
            return Err(Error::InvalidArgument(format!(
                "segment range start {} exceeds end {}",
                start, end
            )));
        }

        let covered = self.index.raw_len();
        let start = start.min(covered);
        let end = end.min(covered);
        let raw = &self.raw[start as usize..end as usize];

        Ok(segment_output_by_resize_events(raw, &self.events, start))
    }

    /// Playback segments for the elapsed-time window `[t0, t1]`.
    pub fn segments_between_times(&self, t0: u64, t1: u64) -> Result<SegmentIter<'_>> {
        if t0 > t1 {
            return Err(Error::InvalidArgument(format!(
                "time window start {} exceeds end {}",
                t0, t1
            )));
        }
        let start = self.offset_at_time_ns(t0);
        let end = self.offset_at_time_ns(t1);
        self.segments_between_offsets(start, end)
    }
}

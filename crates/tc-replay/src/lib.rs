// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

// Capture playback
//
// Turns the artifacts of a terminal capture (raw output stream, TIDX time
// index, resize event log) into an ordered sequence of playback segments:
// raw byte runs interleaved with the resizes that occurred between them,
// positioned by byte offset.

pub mod error;
pub mod segment;
pub mod session;

// Re-export key types for convenience
pub use error::{Error, Result};
pub use segment::{
    last_resize_before_offset, segment_output_by_resize_events, Segment, SegmentIter,
};
pub use session::Session;

// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Byte-position interleaving of raw output and resize events
//!
//! Faithful playback has to apply each resize at the exact byte position it
//! occurred at, not merely in timestamp order. The segmenter walks a raw
//! byte range and a sorted event list with a single cursor and yields the
//! two interleaved, ready to feed to whatever renders them.

use tc_events::ResizeEvent;

/// A unit of playback output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// A run of raw output bytes
    Bytes(&'a [u8]),
    /// A resize taking effect at the current position
    Event(ResizeEvent),
}

/// Lazy iterator over the segments of one playback window.
///
/// Produced by [`segment_output_by_resize_events`]; finite, and restartable
/// by calling the constructor again.
pub struct SegmentIter<'a> {
    raw: &'a [u8],
    events: &'a [ResizeEvent],
    base_offset: u64,
    /// Absolute raw-stream offset of the next unemitted byte
    cursor: u64,
    next_event: usize,
}

impl<'a> Iterator for SegmentIter<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Segment<'a>> {
        let end = self.base_offset + self.raw.len() as u64;

        if let Some(event) = self.events.get(self.next_event) {
            if event.stream_offset <= end {
                if event.stream_offset > self.cursor {
                    // Bytes up to the event first; the event segment comes
                    // on the following call.
                    let from = (self.cursor - self.base_offset) as usize;
                    let to = (event.stream_offset - self.base_offset) as usize;
                    self.cursor = event.stream_offset;
                    return Some(Segment::Bytes(&self.raw[from..to]));
                }
                self.next_event += 1;
                return Some(Segment::Event(*event));
            }
        }

        if self.cursor < end {
            let from = (self.cursor - self.base_offset) as usize;
            self.cursor = end;
            return Some(Segment::Bytes(&self.raw[from..]));
        }

        None
    }
}

/// Interleave `raw` (interpreted as starting at absolute offset
/// `base_offset`) with the events of `events` that fall inside
/// `[base_offset, base_offset + raw.len()]`.
///
/// `events` must already be in canonical `(stream_offset, t_ns)` order (see
/// [`tc_events::normalize_resize_events`]). Events positioned before
/// `base_offset` are ignored; an event at exactly the end offset is emitted
/// after the final byte segment. Empty byte segments are never emitted, so
/// events sharing an offset appear consecutively.
pub fn segment_output_by_resize_events<'a>(
    raw: &'a [u8],
    events: &'a [ResizeEvent],
    base_offset: u64,
) -> SegmentIter<'a> {
    let first = events.partition_point(|e| e.stream_offset < base_offset);
    SegmentIter {
        raw,
        events,
        base_offset,
        cursor: base_offset,
        next_event: first,
    }
}

/// Last event strictly before `start`, if any.
///
/// Used to establish the terminal geometry already in effect when a
/// playback window opens, before any event segments inside the window.
pub fn last_resize_before_offset(events: &[ResizeEvent], start: u64) -> Option<&ResizeEvent> {
    let first_at_or_after = events.partition_point(|e| e.stream_offset < start);
    first_at_or_after.checked_sub(1).map(|i| &events[i])
}

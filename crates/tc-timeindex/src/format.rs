// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! TIDX binary format
//!
//! A TIDX file maps monotonic capture time to byte offsets in the raw
//! output stream of a terminal session:
//!
//! ```text
//! offset 0:  5 bytes  magic "TIDX1"
//! offset 5:  1 byte   flags              (must be 0)
//! offset 6:  8 bytes  started_at_unix_ns (u64 LE)
//! offset 14: repeated ULEB128 pairs until end of buffer:
//!              varint  t_ns        (absolute elapsed ns since start)
//!              varint  end_offset  (absolute cumulative raw byte offset)
//! ```
//!
//! The record stream has no length prefix or trailer; a capture process
//! appends pairs until it exits (or is killed mid-write, leaving a torn
//! tail — see [`DecodeOptions::allow_trailing_partial`]).

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use tracing::trace;

use crate::error::{Error, Result};
use crate::varint;

/// Magic bytes at the start of every TIDX file
pub const TIDX_MAGIC: &[u8; 5] = b"TIDX1";

/// Size of the fixed header (magic + flags + started_at_unix_ns)
pub const TIDX_HEADER_SIZE: usize = 14;

/// Decoded time index for one capture session.
///
/// `t_ns` and `end_offsets` are parallel, index-aligned arrays; both are
/// non-decreasing by construction of the writer (the decoder does not
/// re-validate this). `end_offsets[i]` is the raw-stream offset immediately
/// after all bytes accounted for by record `i`. The index is immutable once
/// constructed; crash repair produces a new instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TidxIndex {
    /// Reserved flags byte; only 0 is currently defined
    pub flags: u8,
    /// Wall-clock epoch nanoseconds at capture start
    pub started_at_unix_ns: u64,
    /// Per-record elapsed nanoseconds since capture start
    pub t_ns: Vec<u64>,
    /// Per-record cumulative byte offset into the raw stream
    pub end_offsets: Vec<u64>,
}

impl TidxIndex {
    /// Create an empty index with the given start time
    pub fn new(started_at_unix_ns: u64) -> Self {
        Self {
            flags: 0,
            started_at_unix_ns,
            t_ns: Vec::new(),
            end_offsets: Vec::new(),
        }
    }

    /// Number of checkpoint records
    pub fn len(&self) -> usize {
        self.t_ns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t_ns.is_empty()
    }

    /// Elapsed nanoseconds covered by the index (time of the last record)
    pub fn duration_ns(&self) -> u64 {
        self.t_ns.last().copied().unwrap_or(0)
    }

    /// Raw-stream bytes covered by the index (offset of the last record)
    pub fn raw_len(&self) -> u64 {
        self.end_offsets.last().copied().unwrap_or(0)
    }
}

/// Options controlling TIDX decoding
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Silently drop an incomplete trailing record instead of failing with
    /// [`Error::Truncated`]. Set this when the capture process may have been
    /// killed mid-write.
    pub allow_trailing_partial: bool,
}

/// Decode a TIDX buffer into a [`TidxIndex`].
///
/// A non-zero flags byte fails with [`Error::UnsupportedFlags`] before any
/// record parsing. An incomplete header fails with [`Error::Truncated`]; a
/// wrong magic with [`Error::InvalidArgument`]. Record pairs are consumed to
/// the exact end of the buffer; a trailing partial pair is governed by
/// `opts.allow_trailing_partial`. A varint wider than 64 bits is corruption
/// rather than a torn write and fails with [`Error::Overflow`] regardless of
/// the option.
pub fn decode_tidx(bytes: &[u8], opts: DecodeOptions) -> Result<TidxIndex> {
    if bytes.len() < TIDX_HEADER_SIZE {
        return Err(Error::Truncated);
    }

    let mut header = &bytes[..TIDX_HEADER_SIZE];
    let mut magic = [0u8; 5];
    std::io::Read::read_exact(&mut header, &mut magic)?;
    if &magic != TIDX_MAGIC {
        return Err(Error::InvalidArgument(format!(
            "bad TIDX magic: expected {:?}, got {:?}",
            TIDX_MAGIC, magic
        )));
    }

    let flags = header.read_u8()?;
    if flags != 0 {
        return Err(Error::UnsupportedFlags(flags));
    }

    let started_at_unix_ns = header.read_u64::<LittleEndian>()?;

    let mut index = TidxIndex::new(started_at_unix_ns);
    let mut pos = TIDX_HEADER_SIZE;

    while pos < bytes.len() {
        let record_start = pos;

        let (t, next) = match varint::decode_u64(bytes, pos) {
            Ok(ok) => ok,
            Err(Error::Truncated) if opts.allow_trailing_partial => break,
            Err(e) => return Err(e),
        };
        let (end, next) = match varint::decode_u64(bytes, next) {
            Ok(ok) => ok,
            Err(Error::Truncated) if opts.allow_trailing_partial => break,
            Err(e) => return Err(e),
        };
        pos = next;

        trace!(record = index.len(), t_ns = t, end_offset = end, at = record_start, "decoded checkpoint");
        index.t_ns.push(t);
        index.end_offsets.push(end);
    }

    Ok(index)
}

/// Encode a [`TidxIndex`] to its byte-exact TIDX representation.
///
/// Fails with [`Error::InvalidArgument`] if the parallel arrays differ in
/// length or the flags byte is non-zero (no other flag value has a defined
/// encoding).
pub fn encode_tidx(index: &TidxIndex) -> Result<Vec<u8>> {
    if index.t_ns.len() != index.end_offsets.len() {
        return Err(Error::InvalidArgument(format!(
            "parallel array length mismatch: {} times vs {} offsets",
            index.t_ns.len(),
            index.end_offsets.len()
        )));
    }
    if index.flags != 0 {
        return Err(Error::UnsupportedFlags(index.flags));
    }

    let mut buf = Vec::with_capacity(TIDX_HEADER_SIZE + index.len() * 4);
    buf.extend_from_slice(TIDX_MAGIC);
    buf.write_u8(index.flags)?;
    buf.write_u64::<LittleEndian>(index.started_at_unix_ns)?;

    for (&t, &end) in index.t_ns.iter().zip(&index.end_offsets) {
        varint::encode_u64(&mut buf, t);
        varint::encode_u64(&mut buf, end);
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(flags: u8, started_at: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(TIDX_MAGIC);
        buf.push(flags);
        buf.extend_from_slice(&started_at.to_le_bytes());
        buf
    }

    #[test]
    fn test_header_only_roundtrip() {
        let index = TidxIndex::new(1_700_000_000_000_000_000);
        let bytes = encode_tidx(&index).unwrap();
        assert_eq!(bytes.len(), TIDX_HEADER_SIZE);

        let decoded = decode_tidx(&bytes, DecodeOptions::default()).unwrap();
        assert_eq!(decoded, index);
        assert!(decoded.is_empty());
        assert_eq!(decoded.duration_ns(), 0);
        assert_eq!(decoded.raw_len(), 0);
    }

    #[test]
    fn test_record_roundtrip() {
        let mut index = TidxIndex::new(42);
        index.t_ns = vec![10, 20, 30, 1_000_000_000];
        index.end_offsets = vec![5, 10, 20, 1 << 40];

        let bytes = encode_tidx(&index).unwrap();
        let decoded = decode_tidx(&bytes, DecodeOptions::default()).unwrap();
        assert_eq!(decoded, index);
        assert_eq!(decoded.len(), 4);
        assert_eq!(decoded.duration_ns(), 1_000_000_000);
        assert_eq!(decoded.raw_len(), 1 << 40);
    }

    #[test]
    fn test_nonzero_flags_rejected_before_records() {
        // Flags gate fires even when the record stream is nonsense.
        let mut bytes = header_bytes(0x01, 0);
        bytes.extend_from_slice(&[0x80, 0x80, 0x80]);
        let err = decode_tidx(&bytes, DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFlags(0x01)));

        let err = decode_tidx(
            &bytes,
            DecodeOptions {
                allow_trailing_partial: true,
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFlags(0x01)));
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = header_bytes(0, 0);
        bytes[0] = b'X';
        let err = decode_tidx(&bytes, DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_short_header_is_truncated() {
        let bytes = header_bytes(0, 0);
        for len in 0..TIDX_HEADER_SIZE {
            let err = decode_tidx(&bytes[..len], DecodeOptions::default()).unwrap_err();
            assert!(matches!(err, Error::Truncated), "header prefix of {} bytes", len);
        }
    }

    #[test]
    fn test_trailing_partial_record() {
        let mut index = TidxIndex::new(7);
        index.t_ns = vec![100, 200];
        index.end_offsets = vec![64, 128];
        let mut bytes = encode_tidx(&index).unwrap();

        // A lone continuation byte where the next record should start.
        bytes.push(0x80);

        let err = decode_tidx(&bytes, DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Truncated));

        let decoded = decode_tidx(
            &bytes,
            DecodeOptions {
                allow_trailing_partial: true,
            },
        )
        .unwrap();
        assert_eq!(decoded, index);
    }

    #[test]
    fn test_trailing_partial_missing_second_varint() {
        // Torn between the pair's two varints: the t_ns decoded but the
        // end_offset never made it to disk.
        let mut index = TidxIndex::new(7);
        index.t_ns = vec![100];
        index.end_offsets = vec![64];
        let mut bytes = encode_tidx(&index).unwrap();
        bytes.push(0x05); // complete t_ns varint, no end_offset after it

        let err = decode_tidx(&bytes, DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Truncated));

        let decoded = decode_tidx(
            &bytes,
            DecodeOptions {
                allow_trailing_partial: true,
            },
        )
        .unwrap();
        assert_eq!(decoded.t_ns, vec![100]);
        assert_eq!(decoded.end_offsets, vec![64]);
    }

    #[test]
    fn test_overflow_propagates_despite_trailing_partial() {
        let mut bytes = header_bytes(0, 0);
        bytes.extend_from_slice(&[0x80u8; 10]);
        let err = decode_tidx(
            &bytes,
            DecodeOptions {
                allow_trailing_partial: true,
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::Overflow));
    }

    #[test]
    fn test_encode_rejects_mismatched_arrays() {
        let mut index = TidxIndex::new(0);
        index.t_ns = vec![1, 2];
        index.end_offsets = vec![1];
        let err = encode_tidx(&index).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_encode_rejects_nonzero_flags() {
        let mut index = TidxIndex::new(0);
        index.flags = 0x40;
        let err = encode_tidx(&index).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFlags(0x40)));
    }
}

// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! ULEB128 variable-length integer codec
//!
//! Every integer field in the TIDX record stream is stored as an unsigned
//! little-endian base-128 varint: 7 payload bits per byte, low-order group
//! first, high bit set on every byte except the last. Small values (the
//! common case for time deltas and offsets near the start of a capture)
//! take a single byte; `u64::MAX` takes ten.

use crate::error::{Error, Result};

/// Encode `value` as a ULEB128 varint, appending to `buf`.
///
/// Always emits at least one byte (`0` encodes as a single `0x00`). The
/// encoding is minimal: no trailing zero high-order groups are produced.
pub fn encode_u64(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;

        if value != 0 {
            byte |= 0x80; // Set continuation bit
        }

        buf.push(byte);

        if value == 0 {
            break;
        }
    }
}

/// Decode a ULEB128 varint from `bytes` starting at `offset`.
///
/// Returns the decoded value and the offset of the first byte after it.
/// Fails with [`Error::Truncated`] if the buffer ends before a byte without
/// the continuation bit is found, and with [`Error::Overflow`] if the
/// accumulated shift reaches 64 bits before termination or the decoded value
/// would not fit in a `u64`. Never reads past `bytes.len()`.
pub fn decode_u64(bytes: &[u8], offset: usize) -> Result<(u64, usize)> {
    let mut value: u64 = 0;
    let mut shift: u32 = 0;
    let mut pos = offset;

    loop {
        if shift >= 64 {
            return Err(Error::Overflow);
        }

        let byte = match bytes.get(pos) {
            Some(&b) => b,
            None => return Err(Error::Truncated),
        };
        pos += 1;

        let group = (byte & 0x7F) as u64;

        // At shift 63 only the lowest payload bit still fits.
        if shift == 63 && group > 1 {
            return Err(Error::Overflow);
        }

        value |= group << shift;

        if byte & 0x80 == 0 {
            return Ok((value, pos));
        }

        shift += 7;
    }
}

/// Number of bytes `value` occupies when varint-encoded.
pub fn encoded_len(value: u64) -> usize {
    match value {
        0 => 1,
        v => (70 - v.leading_zeros() as usize) / 7,
    }
}

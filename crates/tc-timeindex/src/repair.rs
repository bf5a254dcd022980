// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Crash repair for a decoded index
//!
//! The TIDX file and the raw output stream are appended by the capture
//! process without coordination, so a crash or kill can leave the index
//! claiming bytes that never reached the raw file. Before any seek that
//! will also read raw bytes, the index must be trimmed to what actually
//! exists on disk.

use crate::format::TidxIndex;

/// Trim `index` to the prefix of records fully backed by `raw_byte_len`
/// bytes of raw data.
///
/// Keeps exactly the records with `end_offsets[i] <= raw_byte_len`; records
/// are dropped wholesale from the tail, never patched. Any input length
/// (including 0) yields a valid, possibly empty index. Returns a new
/// instance; the input is not mutated.
pub fn truncate_to_raw_len(index: &TidxIndex, raw_byte_len: u64) -> TidxIndex {
    // end_offsets is non-decreasing, so the keep-set is a prefix.
    let keep = index.end_offsets.partition_point(|&end| end <= raw_byte_len);

    TidxIndex {
        flags: index.flags,
        started_at_unix_ns: index.started_at_unix_ns,
        t_ns: index.t_ns[..keep].to_vec(),
        end_offsets: index.end_offsets[..keep].to_vec(),
    }
}

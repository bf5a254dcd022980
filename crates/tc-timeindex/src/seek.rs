// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Point queries over a decoded index
//!
//! Both lookups are pure binary searches over the sorted parallel arrays
//! and never fail: out-of-range queries degrade to the documented boundary
//! values. Run [`crate::repair::truncate_to_raw_len`] first whenever the
//! raw stream may be shorter than the index claims; these queries trust
//! every offset in the index to be backed by data.
//!
//! Lookup rule (identical in both directions): a query of `0` answers `0`;
//! otherwise the first record whose coordinate reaches the query answers
//! with its paired value, a query past the last record clamps to the last
//! record, and records sharing the matched coordinate resolve to the
//! latest of them.

use crate::format::TidxIndex;

/// Byte offset of the raw stream position corresponding to elapsed time `t`.
pub fn offset_at_time_ns(index: &TidxIndex, t: u64) -> u64 {
    lookup(&index.t_ns, &index.end_offsets, t)
}

/// Elapsed time corresponding to raw stream byte offset `offset`.
pub fn time_at_offset_ns(index: &TidxIndex, offset: u64) -> u64 {
    lookup(&index.end_offsets, &index.t_ns, offset)
}

fn lookup(keys: &[u64], values: &[u64], query: u64) -> u64 {
    if query == 0 || keys.is_empty() {
        return 0;
    }

    let first = keys.partition_point(|&k| k < query);
    if first == keys.len() {
        // Past the last record: clamp.
        return values[keys.len() - 1];
    }

    // Latest record sharing the matched key.
    let last = keys.partition_point(|&k| k <= keys[first]) - 1;
    values[last]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(t_ns: Vec<u64>, end_offsets: Vec<u64>) -> TidxIndex {
        TidxIndex {
            flags: 0,
            started_at_unix_ns: 0,
            t_ns,
            end_offsets,
        }
    }

    #[test]
    fn test_offset_at_time_vectors() {
        let idx = index(vec![10, 20, 30], vec![5, 10, 15]);
        assert_eq!(offset_at_time_ns(&idx, 0), 0);
        assert_eq!(offset_at_time_ns(&idx, 1), 5);
        assert_eq!(offset_at_time_ns(&idx, 10), 5);
        assert_eq!(offset_at_time_ns(&idx, 11), 10);
        assert_eq!(offset_at_time_ns(&idx, 100), 15);
    }

    #[test]
    fn test_time_at_offset_vectors() {
        let idx = index(vec![10, 20, 30], vec![5, 10, 15]);
        assert_eq!(time_at_offset_ns(&idx, 0), 0);
        assert_eq!(time_at_offset_ns(&idx, 1), 10);
        assert_eq!(time_at_offset_ns(&idx, 5), 10);
        assert_eq!(time_at_offset_ns(&idx, 6), 20);
        assert_eq!(time_at_offset_ns(&idx, 999), 30);
    }

    #[test]
    fn test_empty_index_degrades_to_zero() {
        let idx = index(vec![], vec![]);
        assert_eq!(offset_at_time_ns(&idx, 0), 0);
        assert_eq!(offset_at_time_ns(&idx, 12345), 0);
        assert_eq!(time_at_offset_ns(&idx, 0), 0);
        assert_eq!(time_at_offset_ns(&idx, 12345), 0);
    }

    #[test]
    fn test_ties_resolve_to_latest_record() {
        // Two checkpoints in the same nanosecond: the later one wins.
        let idx = index(vec![10, 10, 20], vec![5, 8, 12]);
        assert_eq!(offset_at_time_ns(&idx, 10), 8);
        assert_eq!(offset_at_time_ns(&idx, 5), 8);

        // Two checkpoints at the same offset (no bytes between them).
        let idx = index(vec![10, 20, 30], vec![5, 5, 12]);
        assert_eq!(time_at_offset_ns(&idx, 5), 20);
        assert_eq!(time_at_offset_ns(&idx, 3), 20);
    }

    #[test]
    fn test_both_directions_agree() {
        // Seeking to the time of a checkpoint and back lands on the same
        // record for strictly increasing coordinates.
        let idx = index(vec![10, 20, 30, 40], vec![4, 9, 25, 31]);
        for i in 0..idx.len() {
            let t = idx.t_ns[i];
            let off = idx.end_offsets[i];
            assert_eq!(offset_at_time_ns(&idx, t), off);
            assert_eq!(time_at_offset_ns(&idx, off), t);
        }
    }

    #[test]
    fn test_single_record() {
        let idx = index(vec![50], vec![7]);
        assert_eq!(offset_at_time_ns(&idx, 0), 0);
        assert_eq!(offset_at_time_ns(&idx, 1), 7);
        assert_eq!(offset_at_time_ns(&idx, 50), 7);
        assert_eq!(offset_at_time_ns(&idx, 51), 7);
        assert_eq!(time_at_offset_ns(&idx, 0), 0);
        assert_eq!(time_at_offset_ns(&idx, 7), 50);
        assert_eq!(time_at_offset_ns(&idx, 8), 50);
    }
}

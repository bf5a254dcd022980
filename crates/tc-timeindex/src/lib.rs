// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

// TIDX time-index format
//
// This crate implements the binary time index written alongside a raw
// terminal capture stream: a fixed header plus an append-only stream of
// varint-encoded `(t_ns, end_offset)` checkpoints. On top of the codec it
// provides crash repair against the observed raw file length and the two
// seek queries (time to offset, offset to time) used by playback.

pub mod error;
pub mod format;
pub mod repair;
pub mod seek;
pub mod varint;
pub mod writer;

// Re-export key types for convenience
pub use error::{Error, Result};
pub use format::{decode_tidx, encode_tidx, DecodeOptions, TidxIndex, TIDX_HEADER_SIZE, TIDX_MAGIC};
pub use repair::truncate_to_raw_len;
pub use seek::{offset_at_time_ns, time_at_offset_ns};
pub use writer::{now_ns, TidxWriter};

// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for the time-index format

use thiserror::Error;

/// Result type alias for time-index operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while encoding, decoding, or writing a TIDX index
#[derive(Debug, Error)]
pub enum Error {
    /// The byte stream ended before a complete varint or record was available
    #[error("truncated input: byte stream ended mid-unit")]
    Truncated,

    /// A varint decoded to a value wider than 64 bits
    #[error("varint overflow: value does not fit in u64")]
    Overflow,

    /// The TIDX flags byte carried a value this implementation does not know
    #[error("unsupported TIDX flags: 0x{0:02x}")]
    UnsupportedFlags(u8),

    /// A caller-supplied argument was malformed or out of range
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

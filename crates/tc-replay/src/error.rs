// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for session reading and playback

use thiserror::Error;

/// Result type alias for replay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while opening or querying a capture session
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("time index error: {0}")]
    Index(#[from] tc_timeindex::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

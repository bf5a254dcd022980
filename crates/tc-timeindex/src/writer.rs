// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Append-only TIDX writer
//!
//! The capture process holds one of these for the lifetime of a session and
//! appends a checkpoint whenever it has flushed raw bytes to the output
//! stream. Checkpoints are written straight through so that a killed capture
//! leaves at most one torn record (which the decoder can drop with
//! `allow_trailing_partial`).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use byteorder::{LittleEndian, WriteBytesExt};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::format::TIDX_MAGIC;
use crate::varint;

/// Append-only writer for a TIDX file
pub struct TidxWriter {
    file: BufWriter<File>,
    /// Time coordinate of the last appended checkpoint
    last_t_ns: u64,
    /// Offset coordinate of the last appended checkpoint
    last_end_offset: u64,
    records: u64,
    finalized: bool,
}

impl TidxWriter {
    /// Create a new TIDX file and write its header
    pub fn create<P: AsRef<Path>>(path: P, started_at_unix_ns: u64) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        let mut file = BufWriter::new(file);

        file.write_all(TIDX_MAGIC)?;
        file.write_u8(0)?; // flags
        file.write_u64::<LittleEndian>(started_at_unix_ns)?;

        debug!(path = ?path.as_ref(), started_at_unix_ns, "created TIDX writer");

        Ok(Self {
            file,
            last_t_ns: 0,
            last_end_offset: 0,
            records: 0,
            finalized: false,
        })
    }

    /// Append one `(t_ns, end_offset)` checkpoint.
    ///
    /// Both coordinates must be non-decreasing across calls; the record
    /// stream's seek structures rely on that ordering, so a regression fails
    /// with [`Error::InvalidArgument`] instead of being written.
    pub fn append_checkpoint(&mut self, t_ns: u64, end_offset: u64) -> Result<()> {
        if self.finalized {
            return Err(Error::InvalidArgument(
                "cannot append to finalized writer".to_string(),
            ));
        }
        if self.records > 0 && (t_ns < self.last_t_ns || end_offset < self.last_end_offset) {
            return Err(Error::InvalidArgument(format!(
                "non-monotonic checkpoint: ({}, {}) after ({}, {})",
                t_ns, end_offset, self.last_t_ns, self.last_end_offset
            )));
        }

        let mut record = Vec::with_capacity(20);
        varint::encode_u64(&mut record, t_ns);
        varint::encode_u64(&mut record, end_offset);
        self.file.write_all(&record)?;

        self.last_t_ns = t_ns;
        self.last_end_offset = end_offset;
        self.records += 1;

        trace!(t_ns, end_offset, records = self.records, "appended checkpoint");
        Ok(())
    }

    /// Flush buffered records to the OS
    pub fn flush(&mut self) -> Result<()> {
        self.file.flush()?;
        Ok(())
    }

    /// Flush and sync the file, consuming the writer
    pub fn finalize(mut self) -> Result<()> {
        self.file.flush()?;
        self.file.get_ref().sync_all()?;
        self.finalized = true;
        debug!(records = self.records, "finalized TIDX writer");
        Ok(())
    }

    /// Number of checkpoints written so far
    pub fn records(&self) -> u64 {
        self.records
    }
}

impl Drop for TidxWriter {
    fn drop(&mut self) {
        if !self.finalized {
            // Best-effort flush on drop
            if let Err(e) = self.file.flush() {
                eprintln!("Warning: failed to flush TIDX writer on drop: {}", e);
            }
        }
    }
}

/// Current system time as nanoseconds since the UNIX epoch
pub fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("System time before UNIX epoch")
        .as_nanos() as u64
}

// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

// Capture inspection tool
//
// Dumps and queries the artifacts a capture process leaves behind. Handy
// when a capture looks wrong: `info` shows whether the index and raw file
// agree, `records` prints every checkpoint, `seek` answers the same point
// queries a player would issue, and `segments` prints the interleaved
// playback stream.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::DateTime;
use clap::{Parser, Subcommand};
use tracing::debug;

use tc_events::normalize_resize_events;
use tc_logging::CliLoggingArgs;
use tc_replay::{Segment, Session};
use tc_timeindex::{
    decode_tidx, offset_at_time_ns, time_at_offset_ns, truncate_to_raw_len, DecodeOptions,
    TidxIndex,
};

#[derive(Parser)]
#[command(name = "tc-inspect", about = "Inspect term-capture session artifacts")]
struct Cli {
    #[command(flatten)]
    logging: CliLoggingArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize a TIDX file (header, record count, coverage)
    Info {
        /// TIDX index file
        tidx: PathBuf,
        /// Raw stream file; when given, the index is repaired against it
        #[arg(long)]
        raw: Option<PathBuf>,
    },
    /// Dump every checkpoint record of a TIDX file
    Records {
        tidx: PathBuf,
        #[arg(long)]
        raw: Option<PathBuf>,
    },
    /// Answer a seek query against a TIDX file
    Seek {
        tidx: PathBuf,
        #[arg(long)]
        raw: Option<PathBuf>,
        /// Map elapsed nanoseconds to a byte offset
        #[arg(long, conflicts_with = "offset")]
        time_ns: Option<u64>,
        /// Map a byte offset to elapsed nanoseconds
        #[arg(long)]
        offset: Option<u64>,
    },
    /// Print the normalized resize events of an event log
    Events {
        /// Newline-delimited JSON event log
        log: PathBuf,
    },
    /// Print the interleaved playback segments of a session
    Segments {
        /// Raw output stream file
        raw: PathBuf,
        /// TIDX index file
        tidx: PathBuf,
        /// Newline-delimited JSON event log
        log: PathBuf,
        /// Window start in elapsed nanoseconds (default: 0)
        #[arg(long, default_value_t = 0)]
        start_ns: u64,
        /// Window end in elapsed nanoseconds (default: end of capture)
        #[arg(long)]
        end_ns: Option<u64>,
    },
}

/// Decode a TIDX file tolerantly and, when the raw file is available,
/// repair the index against its actual length.
fn load_index(tidx: &PathBuf, raw: Option<&PathBuf>) -> Result<TidxIndex> {
    let bytes = fs::read(tidx).with_context(|| format!("failed to read {}", tidx.display()))?;
    let index = decode_tidx(
        &bytes,
        DecodeOptions {
            allow_trailing_partial: true,
        },
    )
    .with_context(|| format!("failed to decode {}", tidx.display()))?;

    match raw {
        Some(raw_path) => {
            let raw_len = fs::metadata(raw_path)
                .with_context(|| format!("failed to stat {}", raw_path.display()))?
                .len();
            let repaired = truncate_to_raw_len(&index, raw_len);
            debug!(
                decoded = index.len(),
                repaired = repaired.len(),
                raw_len,
                "repaired index against raw file"
            );
            Ok(repaired)
        }
        None => Ok(index),
    }
}

fn format_wall_clock(unix_ns: u64) -> String {
    match i64::try_from(unix_ns) {
        Ok(ns) => DateTime::from_timestamp_nanos(ns).to_rfc3339(),
        Err(_) => format!("{} ns past the epoch", unix_ns),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.logging.init("tc-inspect")?;

    match cli.command {
        Command::Info { tidx, raw } => {
            let index = load_index(&tidx, raw.as_ref())?;
            println!("started_at:  {}", format_wall_clock(index.started_at_unix_ns));
            println!("flags:       0x{:02x}", index.flags);
            println!("records:     {}", index.len());
            println!("duration_ns: {}", index.duration_ns());
            println!("raw_bytes:   {}", index.raw_len());
        }
        Command::Records { tidx, raw } => {
            let index = load_index(&tidx, raw.as_ref())?;
            println!("{:>8}  {:>20}  {:>20}", "record", "t_ns", "end_offset");
            for (i, (&t, &end)) in index.t_ns.iter().zip(&index.end_offsets).enumerate() {
                println!("{:>8}  {:>20}  {:>20}", i, t, end);
            }
        }
        Command::Seek {
            tidx,
            raw,
            time_ns,
            offset,
        } => {
            let index = load_index(&tidx, raw.as_ref())?;
            match (time_ns, offset) {
                (Some(t), None) => {
                    println!("{}", offset_at_time_ns(&index, t));
                }
                (None, Some(off)) => {
                    println!("{}", time_at_offset_ns(&index, off));
                }
                _ => anyhow::bail!("exactly one of --time-ns or --offset is required"),
            }
        }
        Command::Events { log } => {
            let text = fs::read_to_string(&log)
                .with_context(|| format!("failed to read {}", log.display()))?;
            let events = normalize_resize_events(&text);
            for event in events {
                println!(
                    "offset={} t_ns={} {}x{}",
                    event.stream_offset, event.t_ns, event.cols, event.rows
                );
            }
        }
        Command::Segments {
            raw,
            tidx,
            log,
            start_ns,
            end_ns,
        } => {
            let session = Session::open(&raw, &tidx, &log)
                .with_context(|| format!("failed to open session from {}", raw.display()))?;
            let end_ns = end_ns.unwrap_or_else(|| session.duration_ns());

            if let Some((cols, rows)) = session.geometry_at_offset(session.offset_at_time_ns(start_ns)) {
                println!("geometry at window start: {}x{}", cols, rows);
            }
            for segment in session.segments_between_times(start_ns, end_ns)? {
                match segment {
                    Segment::Bytes(bytes) => {
                        println!("bytes[{}]: {:?}", bytes.len(), String::from_utf8_lossy(bytes));
                    }
                    Segment::Event(event) => {
                        println!(
                            "resize @{} t_ns={}: {}x{}",
                            event.stream_offset, event.t_ns, event.cols, event.rows
                        );
                    }
                }
            }
        }
    }

    Ok(())
}

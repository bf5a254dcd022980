// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Centralized logging utilities for term-capture
//!
//! Standardized tracing initialization so every binary in the workspace
//! logs the same way: `RUST_LOG` wins when set, otherwise the CLI-supplied
//! level applies to the whole process.

use std::io;
use std::path::Path;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Re-export Level for convenience
pub use tracing::Level;

/// Output format for log messages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable plaintext format
    #[default]
    Plaintext,
    /// Structured JSON format
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Plaintext => write!(f, "plaintext"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Standardized CLI logging arguments for clap integration.
///
/// Flatten into a binary's argument struct with `#[command(flatten)]` and
/// call [`CliLoggingArgs::init`] once at startup.
#[derive(Clone, Debug, clap::Args)]
pub struct CliLoggingArgs {
    /// Log verbosity level
    #[arg(long, default_value = "warn", help = "Log verbosity level")]
    pub log_level: Level,

    /// Log output format
    #[arg(long, value_enum, default_value_t, help = "Log output format")]
    pub log_format: LogFormat,

    /// Log to this file instead of stderr
    #[arg(long, help = "Log to this file instead of stderr")]
    pub log_file: Option<String>,
}

impl Default for CliLoggingArgs {
    fn default() -> Self {
        Self {
            log_level: Level::WARN,
            log_format: LogFormat::default(),
            log_file: None,
        }
    }
}

impl CliLoggingArgs {
    /// Initialize logging for `component` based on the parsed arguments
    pub fn init(&self, component: &str) -> anyhow::Result<()> {
        match &self.log_file {
            Some(path) => init_to_file(component, self.log_level, self.log_format, Path::new(path)),
            None => init(component, self.log_level, self.log_format),
        }
    }
}

/// Initialize logging to stderr
pub fn init(component: &str, default_level: Level, format: LogFormat) -> anyhow::Result<()> {
    init_with_writer(component, default_level, format, io::stderr)
}

/// Initialize logging to a file, creating parent directories as needed
pub fn init_to_file(
    component: &str,
    default_level: Level,
    format: LogFormat,
    log_path: &Path,
) -> anyhow::Result<()> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = std::fs::OpenOptions::new().create(true).append(true).open(log_path)?;
    init_with_writer(component, default_level, format, log_file)
}

/// Initialize logging with a custom writer
pub fn init_with_writer<W>(
    component: &str,
    default_level: Level,
    format: LogFormat,
    writer: W,
) -> anyhow::Result<()>
where
    W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},{}={}", default_level, component, default_level))
    });

    match format {
        LogFormat::Json => {
            let layer = tracing_subscriber::fmt::layer().with_writer(writer).json();
            tracing_subscriber::registry().with(filter).with(layer).try_init()?;
        }
        LogFormat::Plaintext => {
            let layer = tracing_subscriber::fmt::layer().with_writer(writer);
            tracing_subscriber::registry().with(filter).with(layer).try_init()?;
        }
    }

    Ok(())
}

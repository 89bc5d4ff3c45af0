// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-MindMapr-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of MindMapr and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Structured logging via `tracing`.
//!
//! Level and format come from the CLI, then `MINDMAPR_LOG_LEVEL` / `MINDMAPR_LOG_FORMAT`, then
//! `RUST_LOG`, falling back to `info` and `compact`. While the terminal UI owns the screen, logs
//! are written to a file instead of stderr.
//!
//! ```bash
//! # Store operations at debug, everything else at warn
//! RUST_LOG="warn,mindmapr::store=debug" mindmapr list
//! ```

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter, Registry,
};

pub const LOG_LEVEL_ENV: &str = "MINDMAPR_LOG_LEVEL";
pub const LOG_FORMAT_ENV: &str = "MINDMAPR_LOG_FORMAT";
pub const LOG_FILENAME: &str = "mindmapr.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Single line per event
    Compact,
    /// Multi-line with source locations
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(LoggingError::UnknownFormat(s.to_owned())),
        }
    }
}

impl LogFormat {
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Appends to a file; used while the terminal UI is active.
    File(PathBuf),
}

impl LogTarget {
    /// `<data-dir>/mindmapr.log`
    pub fn file_in(data_dir: &Path) -> Self {
        Self::File(data_dir.join(LOG_FILENAME))
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("unknown log format {0:?} (expected compact, pretty or json)")]
    UnknownFormat(String),
    #[error("cannot open log file {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Init(#[from] TryInitError),
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
    target: &LogTarget,
) -> Result<(), LoggingError> {
    let log_level = level
        .map(str::to_owned)
        .or_else(|| std::env::var(LOG_LEVEL_ENV).ok())
        .unwrap_or_else(|| "info".to_owned());

    let log_format = format
        .map(str::to_owned)
        .or_else(|| std::env::var(LOG_FORMAT_ENV).ok())
        .unwrap_or_else(|| "compact".to_owned());
    let format = LogFormat::from_str(&log_format)?;

    let filter = build_filter(level.is_some(), &log_level);
    let (writer, ansi) = make_writer(target)?;

    match format {
        LogFormat::Compact => {
            Registry::default()
                .with(filter)
                .with(
                    fmt::Layer::default()
                        .with_writer(writer)
                        .with_ansi(ansi)
                        .with_target(false)
                        .with_level(true)
                        .with_file(false)
                        .with_line_number(false)
                        .with_span_events(FmtSpan::NONE),
                )
                .try_init()?;
        }
        LogFormat::Pretty => {
            Registry::default()
                .with(filter)
                .with(
                    fmt::Layer::default()
                        .with_writer(writer)
                        .with_ansi(ansi)
                        .with_target(true)
                        .with_level(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_span_events(FmtSpan::ACTIVE)
                        .pretty(),
                )
                .try_init()?;
        }
        LogFormat::Json => {
            Registry::default()
                .with(filter)
                .with(
                    fmt::Layer::default()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_target(true)
                        .with_level(true)
                        .with_file(true)
                        .with_line_number(true)
                        .json(),
                )
                .try_init()?;
        }
    }

    Ok(())
}

// An explicit level wins over RUST_LOG; otherwise RUST_LOG wins over the fallback.
fn build_filter(explicit: bool, log_level: &str) -> EnvFilter {
    if log_level == "off" {
        return EnvFilter::new("off");
    }
    let from_level = || EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    if explicit {
        return from_level();
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| from_level())
}

fn make_writer(target: &LogTarget) -> Result<(BoxMakeWriter, bool), LoggingError> {
    match target {
        LogTarget::Stderr => Ok((BoxMakeWriter::new(io::stderr), true)),
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            Ok((BoxMakeWriter::new(Mutex::new(file)), false))
        }
    }
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| LoggingError::File {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::File {
            path: path.to_path_buf(),
            source,
        })
}

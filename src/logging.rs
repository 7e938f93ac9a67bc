// SPDX-License-Identifier: MIT
//
// Logging setup.
//
// The terminal belongs to the editor while it runs, so logs only ever go to
// a file. Nothing is written to stdout or stderr.
//
// Filter priority:
//
//   1. KED_LOG   ked-specific filter directives (highest priority)
//   2. RUST_LOG  standard tracing filter
//   3. default   `warn`
//
// Log file: `<data_local_dir>/ked/logs/ked-<pid>.log`
//   Linux: ~/.local/share/ked/logs/ked-12345.log
//   macOS: ~/Library/Application Support/ked/logs/ked-12345.log
//
// Override with KED_LOG_FILE. A path with an extension names the file; a
// path without one names the directory.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

const FILTER_ENV: &str = "KED_LOG";
const FILE_ENV: &str = "KED_LOG_FILE";

#[derive(Debug, Error)]
pub enum LogError {
    #[error("cannot create log directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),

    #[error(transparent)]
    Init(#[from] TryInitError),
}

/// Returned from [`init`]; must be held alive so buffered lines reach the
/// file.
pub struct LogGuard {
    _file_guard: WorkerGuard,
    pub log_file: PathBuf,
}

/// Install the file subscriber.
///
/// # Errors
///
/// The log directory cannot be created, a filter variable does not parse,
/// or a global subscriber is already installed.
pub fn init() -> Result<LogGuard, LogError> {
    let (log_dir, filename) = resolve_log_path(env::var_os(FILE_ENV).map(PathBuf::from));

    std::fs::create_dir_all(&log_dir).map_err(|source| LogError::CreateDir {
        path: log_dir.clone(),
        source,
    })?;

    let file_appender = tracing_appender::rolling::never(&log_dir, &filename);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_filter(create_filter()?);

    Registry::default().with(file_layer).try_init()?;

    Ok(LogGuard {
        _file_guard: file_guard,
        log_file: log_dir.join(filename),
    })
}

/// Split the log location into a directory and a file name.
fn resolve_log_path(override_path: Option<PathBuf>) -> (PathBuf, String) {
    let filename = format!("ked-{}.log", std::process::id());

    if let Some(path) = override_path {
        if path.extension().is_some() {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."))
                .to_path_buf();
            let name = path
                .file_name()
                .map_or(filename, |n| n.to_string_lossy().into_owned());
            return (dir, name);
        }
        return (path, filename);
    }

    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ked")
        .join("logs");

    (dir, filename)
}

fn create_filter() -> Result<EnvFilter, ParseError> {
    filter_from(env::var(FILTER_ENV).ok(), env::var("RUST_LOG").ok())
}

fn filter_from(ked_log: Option<String>, rust_log: Option<String>) -> Result<EnvFilter, ParseError> {
    match ked_log.or(rust_log) {
        Some(directives) => EnvFilter::try_new(directives),
        None => Ok(EnvFilter::new("warn")),
    }
}

//! Process-wide logging bootstrap
//!
//! Installs a `tracing` subscriber writing to the console and, when the
//! `log.file` section is present, to a date-stamped file as well. `RUST_LOG`
//! takes precedence over the configured level.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ks_shared::config::{LogFormat, LoggingConfig};
use thiserror::Error;
use tracing_subscriber::{
    filter::ParseError, fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
    EnvFilter, Layer,
};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{directive}': {source}")]
    Filter {
        directive: String,
        #[source]
        source: ParseError,
    },

    #[error("Cannot open log file {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Logging already initialized: {0}")]
    Init(#[from] TryInitError),
}

/// Keeps the log file open for the life of the process
///
/// Dropping the guard flushes the file.
#[must_use = "dropping the guard closes the log file"]
#[derive(Debug, Default)]
pub struct LoggingGuard {
    file: Option<Arc<File>>,
    path: Option<PathBuf>,
}

impl LoggingGuard {
    /// Path of the log file, if one is being written
    pub fn file_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Drop for LoggingGuard {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let mut file: &File = &file;
            let _ = file.flush();
            let _ = file.sync_all();
        }
    }
}

/// Install the global subscriber
///
/// `verbose` raises the configured level to `debug`.
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> Result<LoggingGuard, LoggingError> {
    let filter = build_filter(config, verbose)?;

    let (file, path) = match &config.file {
        Some(file_config) => {
            let date_stamp = chrono::Local::now().format("%Y%m%d").to_string();
            let path = file_config.path_for(&date_stamp);
            let file = open_log_file(&path)?;
            (Some(Arc::new(file)), Some(path))
        }
        None => (None, None),
    };

    let console = match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_file(config.source_location)
            .with_line_number(config.source_location)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_ansi(config.colored)
            .with_file(config.source_location)
            .with_line_number(config.source_location)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_ansi(config.colored)
            .with_file(config.source_location)
            .with_line_number(config.source_location)
            .boxed(),
    };

    let file_layer = file.as_ref().map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(Arc::clone(file))
            .boxed()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()?;

    if let Some(path) = &path {
        tracing::info!("Writing logs to {}", path.display());
    }

    Ok(LoggingGuard { file, path })
}

fn build_filter(config: &LoggingConfig, verbose: bool) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let directive = if verbose { "debug" } else { config.level.as_str() };
    EnvFilter::try_new(directive).map_err(|source| LoggingError::Filter {
        directive: directive.to_string(),
        source,
    })
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    let to_error = |source| LoggingError::File {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(to_error)?;
        }
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_error)
}

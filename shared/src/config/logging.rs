//! Logging configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: LogFormat,

    /// Also write logs to a date-stamped file
    pub file: Option<FileLoggingConfig>,

    /// Enable colored output (terminal only)
    pub colored: bool,

    /// Include source location in logs
    pub source_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: LogFormat::Pretty,
            file: None,
            colored: true,
            source_location: false,
        }
    }
}

/// Log format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

/// File logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory the log file is created in
    pub directory: PathBuf,

    /// File name prefix; the file is `<prefix>-YYYYMMDD.log`
    pub file_name_prefix: String,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("log"),
            file_name_prefix: String::from("keystone"),
        }
    }
}

impl FileLoggingConfig {
    /// Full path of the log file for the given `YYYYMMDD` date stamp
    pub fn path_for(&self, date_stamp: &str) -> PathBuf {
        self.directory
            .join(format!("{}-{}.log", self.file_name_prefix, date_stamp))
    }
}

//! Error types for the logging core
//!
//! Logging calls themselves never fail. These errors describe the degraded
//! states the core recovers from and reports through `tracing`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised inside the logging core
#[derive(Debug, Error)]
pub enum LogError {
    /// A `Display` implementation returned an error while rendering a message
    #[error("message formatting failed")]
    Format,

    /// A file sink could not open its target
    #[error("failed to open log file {path:?}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration value exists but has the wrong type or range
    #[error("invalid value for setting '{key}'")]
    InvalidSetting { key: String },
}

pub type Result<T> = std::result::Result<T, LogError>;

//! CLI error types.

use std::path::PathBuf;
use thiserror::Error;

/// CLI errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Required arguments are missing or malformed.
    ///
    /// Raised before any policy is resolved; the backend is never started.
    #[error("usage: {0}")]
    Usage(String),

    /// The configuration file could not be read or parsed.
    #[error("config error in {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Replacing the process with the backend failed.
    #[error("failed to execute {command}: {source}")]
    Exec {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

//! Fatal error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a validation run before a report can be produced.
///
/// Everything that goes wrong *inside* a readable package is reported as a
/// [`Problem`](crate::Problem) instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to open package '{}': {source}", path.display())]
    ArchiveOpen {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to read config '{}': {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config '{}': {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Configuration error: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;

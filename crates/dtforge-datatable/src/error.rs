//! Error types for DataTable decoding and encoding.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or saving a DataTable.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An input file does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The table was not loaded from disk, so it has nowhere to be saved.
    #[error("table has no source {0} path")]
    MissingPath(&'static str),

    /// Structural assumptions about the payload do not hold.
    #[error("malformed container: {0}")]
    MalformedContainer(String),

    /// A property or array element type outside the supported set.
    #[error("unsupported property kind: {0}")]
    UnsupportedKind(String),

    /// Name-table failure.
    #[error(transparent)]
    Names(#[from] dtforge_uasset::Error),
}

impl Error {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedContainer(message.into())
    }
}

impl From<dtforge_common::Error> for Error {
    fn from(err: dtforge_common::Error) -> Self {
        match err {
            dtforge_common::Error::Io(io) => Self::Io(io),
            other => Self::MalformedContainer(other.to_string()),
        }
    }
}

/// Result type for DataTable operations.
pub type Result<T> = std::result::Result<T, Error>;

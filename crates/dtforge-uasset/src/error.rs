//! Error types for metadata-file handling.

use thiserror::Error;

/// Errors that can occur when reading or patching a metadata file.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Structural or offset assumptions about the file do not hold.
    #[error("malformed container: {0}")]
    MalformedContainer(String),

    /// A name reference points past the end of the name table.
    #[error("unknown name index: {0}")]
    UnknownIndex(i32),

    /// A string lookup missed the name table.
    #[error("unknown name: {0:?}")]
    UnknownName(String),
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

/// Result type for metadata-file operations.
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for dtforge-common.

use thiserror::Error;

/// Common error type for dtforge operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer at {position:#x}: needed {needed} bytes but only {available} available")]
    UnexpectedEof {
        position: usize,
        needed: usize,
        available: usize,
    },

    /// A string length prefix that cannot describe a real string.
    #[error("invalid string length {length} at {position:#x}")]
    InvalidStringLength { position: usize, length: i32 },

    /// UTF-16 payload with unpaired surrogates.
    #[error("invalid UTF-16 string at {position:#x}")]
    InvalidUtf16 { position: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

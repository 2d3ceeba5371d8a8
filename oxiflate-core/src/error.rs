//! Error types for OxiFlate operations.
//!
//! Every failure surfaced by the streaming adapters falls into one of a small
//! number of classes: configuration errors reported at construction, data
//! errors in the compressed input, engine resource/state errors, sink contract
//! violations, and usage errors (calls made out of order). End of stream is
//! never an error.

use std::io;
use thiserror::Error;

/// The main error type for OxiFlate operations.
#[derive(Debug, Error)]
pub enum OxiFlateError {
    /// I/O error from the upstream source or downstream sink.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid or conflicting configuration.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },

    /// Malformed compressed input.
    #[error("Corrupted data: {message}")]
    DataCorrupt {
        /// Description of the corruption.
        message: String,
    },

    /// Upstream ended in the middle of a member.
    #[error("Truncated stream: input ended after {consumed} bytes inside a member")]
    TruncatedStream {
        /// Total compressed bytes consumed before the input ended.
        consumed: u64,
    },

    /// The engine could not allocate memory.
    #[error("Engine out of memory")]
    OutOfMemory,

    /// The engine could not make progress with the buffers it was given.
    #[error("Engine reported buffer too small with no progress")]
    BufferTooSmall,

    /// The engine and the supplied stream or header are incompatible.
    #[error("Engine version mismatch")]
    VersionMismatch,

    /// The engine was driven in an order it does not accept.
    #[error("Engine stream state error")]
    StreamState,

    /// System-level fault reported by the engine.
    #[error("OS error: {0}")]
    Os(io::Error),

    /// The sink stopped accepting bytes before the whole slice was written.
    #[error("Short write: sink accepted {written} of {expected} bytes")]
    ShortWrite {
        /// Bytes accepted by the sink.
        written: usize,
        /// Bytes offered to the sink.
        expected: usize,
    },

    /// An operation was called out of order or is unsupported in this mode.
    #[error("Usage error: {message}")]
    Usage {
        /// Description of the misuse.
        message: String,
    },

    /// Unrecognized engine status code.
    #[error("Unknown engine status {code}")]
    Unknown {
        /// Raw status code.
        code: i32,
    },
}

/// Result type alias for OxiFlate operations.
pub type Result<T> = std::result::Result<T, OxiFlateError>;

impl OxiFlateError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a data corruption error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::DataCorrupt {
            message: message.into(),
        }
    }

    /// Create a truncated stream error.
    pub fn truncated(consumed: u64) -> Self {
        Self::TruncatedStream { consumed }
    }

    /// Create a short write error.
    pub fn short_write(written: usize, expected: usize) -> Self {
        Self::ShortWrite { written, expected }
    }

    /// Create a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Returns true for errors caused by the compressed input itself.
    pub fn is_data_error(&self) -> bool {
        matches!(self, Self::DataCorrupt { .. } | Self::TruncatedStream { .. })
    }

    /// Returns true for programming errors (calls made out of order).
    pub fn is_usage_error(&self) -> bool {
        matches!(self, Self::Usage { .. })
    }

    /// The `io::ErrorKind` this error maps to at the `Read`/`Write` boundary.
    pub fn io_kind(&self) -> io::ErrorKind {
        match self {
            Self::Io(e) | Self::Os(e) => e.kind(),
            Self::Config { .. } | Self::Usage { .. } => io::ErrorKind::InvalidInput,
            Self::DataCorrupt { .. } => io::ErrorKind::InvalidData,
            Self::TruncatedStream { .. } => io::ErrorKind::UnexpectedEof,
            Self::OutOfMemory => io::ErrorKind::OutOfMemory,
            Self::ShortWrite { .. } => io::ErrorKind::WriteZero,
            Self::BufferTooSmall
            | Self::VersionMismatch
            | Self::StreamState
            | Self::Unknown { .. } => io::ErrorKind::Other,
        }
    }
}

fn clone_io(err: &io::Error) -> io::Error {
    match err.raw_os_error() {
        Some(code) => io::Error::from_raw_os_error(code),
        None => io::Error::new(err.kind(), err.to_string()),
    }
}

// `io::Error` is not `Clone`; I/O variants are rebuilt from the raw OS code,
// or from kind and message.
impl Clone for OxiFlateError {
    fn clone(&self) -> Self {
        match self {
            Self::Io(e) => Self::Io(clone_io(e)),
            Self::Os(e) => Self::Os(clone_io(e)),
            Self::Config { message } => Self::config(message.clone()),
            Self::DataCorrupt { message } => Self::corrupted(message.clone()),
            Self::TruncatedStream { consumed } => Self::truncated(*consumed),
            Self::OutOfMemory => Self::OutOfMemory,
            Self::BufferTooSmall => Self::BufferTooSmall,
            Self::VersionMismatch => Self::VersionMismatch,
            Self::StreamState => Self::StreamState,
            Self::ShortWrite { written, expected } => Self::short_write(*written, *expected),
            Self::Usage { message } => Self::usage(message.clone()),
            Self::Unknown { code } => Self::Unknown { code: *code },
        }
    }
}

impl From<OxiFlateError> for io::Error {
    fn from(err: OxiFlateError) -> Self {
        match err {
            OxiFlateError::Io(e) => e,
            other => io::Error::new(other.io_kind(), other),
        }
    }
}

//! Engine status codes and their translation into [`OxiFlateError`].
//!
//! Engines report the outcome of every call as a raw integer code following
//! the zlib numbering. [`StatusCode::translate`] is the single place where
//! those codes cross into the crate's error taxonomy.

use crate::error::{OxiFlateError, Result};
use std::fmt;
use std::io;

/// Raw status code returned by a codec engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub i32);

impl StatusCode {
    /// Progress was made.
    pub const OK: Self = Self(0);
    /// The current member ended (or, when finishing, the stream is complete).
    pub const STREAM_END: Self = Self(1);
    /// A preset dictionary is required to continue.
    pub const NEED_DICT: Self = Self(2);
    /// System error; consult the platform's last error.
    pub const ERRNO: Self = Self(-1);
    /// The engine was driven in an inconsistent order.
    pub const STREAM_ERROR: Self = Self(-2);
    /// The compressed input is malformed.
    pub const DATA_ERROR: Self = Self(-3);
    /// Allocation failure.
    pub const MEM_ERROR: Self = Self(-4);
    /// No progress was possible with the supplied buffers.
    pub const BUF_ERROR: Self = Self(-5);
    /// Incompatible engine version.
    pub const VERSION_ERROR: Self = Self(-6);

    /// Raw code value.
    pub fn code(self) -> i32 {
        self.0
    }

    /// Translate the code into the crate's error taxonomy.
    ///
    /// Stream end is a success signal and is returned as
    /// [`Progress::StreamEnd`], never as an error.
    pub fn translate(self) -> Result<Progress> {
        match self {
            Self::OK => Ok(Progress::Ok),
            Self::STREAM_END => Ok(Progress::StreamEnd),
            Self::DATA_ERROR => Err(OxiFlateError::corrupted("invalid compressed data")),
            Self::MEM_ERROR => Err(OxiFlateError::OutOfMemory),
            Self::BUF_ERROR => Err(OxiFlateError::BufferTooSmall),
            Self::VERSION_ERROR => Err(OxiFlateError::VersionMismatch),
            Self::STREAM_ERROR => Err(OxiFlateError::StreamState),
            Self::ERRNO => Err(OxiFlateError::Os(io::Error::last_os_error())),
            Self(code) => {
                tracing::debug!(code, "unrecognized engine status");
                Err(OxiFlateError::Unknown { code })
            }
        }
    }

    /// Translate, treating anything but `OK` as a failure.
    ///
    /// Used for lifecycle calls (`reset`, `end`, header exchange) where a
    /// stream end status has no meaning.
    pub fn check(self) -> Result<()> {
        match self.translate()? {
            Progress::Ok => Ok(()),
            Progress::StreamEnd => Err(OxiFlateError::StreamState),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::OK => "ok",
            Self::STREAM_END => "stream end",
            Self::NEED_DICT => "need dictionary",
            Self::ERRNO => "errno",
            Self::STREAM_ERROR => "stream error",
            Self::DATA_ERROR => "data error",
            Self::MEM_ERROR => "memory error",
            Self::BUF_ERROR => "buffer error",
            Self::VERSION_ERROR => "version error",
            _ => return write!(f, "status {}", self.0),
        };
        f.write_str(name)
    }
}

/// Successful outcome of an engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// The engine made progress and the member continues.
    Ok,
    /// The member (or, when finishing, the whole stream) is complete.
    StreamEnd,
}

//! Gzip member header metadata.

use crate::error::{OxiFlateError, Result};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// OS byte meaning "unknown" (RFC 1952 section 2.3).
pub const OS_UNKNOWN: u8 = 255;

/// Metadata carried in a gzip member header.
///
/// Unset fields are `None`. When a header is serialized, empty strings and
/// empty byte vectors are treated the same as `None`, so a decoded header
/// never reports a field as present-but-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Free-form comment (FCOMMENT).
    pub comment: Option<String>,
    /// Original file name (FNAME).
    pub filename: Option<String>,
    /// Opaque extra field (FEXTRA), at most 65535 bytes.
    pub extra: Option<Vec<u8>>,
    /// Modification time, second precision.
    pub mtime: Option<SystemTime>,
    /// Originating operating system.
    pub os: u8,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            comment: None,
            filename: None,
            extra: None,
            mtime: None,
            os: OS_UNKNOWN,
        }
    }
}

impl Header {
    /// Create an empty header.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Set the file name.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Set the extra field.
    pub fn with_extra(mut self, extra: impl Into<Vec<u8>>) -> Self {
        self.extra = Some(extra.into());
        self
    }

    /// Set the modification time.
    pub fn with_mtime(mut self, mtime: SystemTime) -> Self {
        self.mtime = Some(mtime);
        self
    }

    /// Set the OS byte.
    pub fn with_os(mut self, os: u8) -> Self {
        self.os = os;
        self
    }

    /// Comment, if set and non-empty.
    pub fn comment_field(&self) -> Option<&str> {
        self.comment.as_deref().filter(|s| !s.is_empty())
    }

    /// File name, if set and non-empty.
    pub fn filename_field(&self) -> Option<&str> {
        self.filename.as_deref().filter(|s| !s.is_empty())
    }

    /// Extra bytes, if set and non-empty.
    pub fn extra_field(&self) -> Option<&[u8]> {
        self.extra.as_deref().filter(|e| !e.is_empty())
    }

    /// Modification time as the 32-bit Unix timestamp stored on the wire.
    ///
    /// Unset and pre-epoch times map to 0 ("no timestamp"). Times that do not
    /// fit in 32 bits are a usage error.
    pub fn mtime_unix(&self) -> Result<u32> {
        let Some(mtime) = self.mtime else {
            return Ok(0);
        };
        let secs = match mtime.duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs(),
            Err(_) => return Ok(0),
        };
        u32::try_from(secs).map_err(|_| {
            OxiFlateError::usage(format!(
                "modification time {secs}s does not fit the 32-bit gzip field"
            ))
        })
    }

    /// Convert a wire timestamp back to a time; 0 means unset.
    pub fn mtime_from_unix(secs: u32) -> Option<SystemTime> {
        if secs == 0 {
            None
        } else {
            Some(UNIX_EPOCH + Duration::from_secs(u64::from(secs)))
        }
    }

    /// Check field constraints that serialization relies on.
    pub fn validate(&self) -> Result<()> {
        if let Some(extra) = self.extra_field() {
            if extra.len() > u16::MAX as usize {
                return Err(OxiFlateError::usage(format!(
                    "extra field of {} bytes exceeds 65535",
                    extra.len()
                )));
            }
        }
        for (name, value) in [
            ("filename", self.filename_field()),
            ("comment", self.comment_field()),
        ] {
            if value.is_some_and(|v| v.as_bytes().contains(&0)) {
                return Err(OxiFlateError::usage(format!("{name} contains a NUL byte")));
            }
        }
        self.mtime_unix()?;
        Ok(())
    }
}

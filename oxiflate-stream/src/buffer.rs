//! Fixed-capacity buffers shared by the adapters.

use oxiflate_core::error::{OxiFlateError, Result};
use std::io::{self, Read, Write};

/// Input staging area for the reader.
///
/// Holds bytes read from upstream that the engine has not consumed yet.
/// `start..end` is the unconsumed window; a refill reuses the allocation.
#[derive(Debug)]
pub(crate) struct InputBuffer {
    buf: Vec<u8>,
    start: usize,
    end: usize,
}

impl InputBuffer {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity],
            start: 0,
            end: 0,
        }
    }

    /// True when every byte read from upstream has been consumed.
    pub(crate) fn is_drained(&self) -> bool {
        self.start == self.end
    }

    /// Unconsumed bytes.
    pub(crate) fn pending(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    pub(crate) fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.end - self.start);
        self.start = (self.start + n).min(self.end);
    }

    /// Refill from `source`, retrying interrupted reads.
    ///
    /// Returns the number of bytes read; 0 means end of data.
    pub(crate) fn refill<R: Read + ?Sized>(&mut self, source: &mut R) -> io::Result<usize> {
        debug_assert!(self.is_drained());
        loop {
            match source.read(&mut self.buf) {
                Ok(n) => {
                    self.start = 0;
                    self.end = n;
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.buf.len()
    }
}

/// Smallest output window handed to the engine for a sync flush.
///
/// Must be larger than an empty flush block, so that a flush repeated after
/// filling the window always finishes short of it.
pub(crate) const MIN_FLUSH_WINDOW: usize = 64;

/// Output scratch area for the writer.
///
/// Ordinary steps see `capacity` bytes; sync flushes see at least
/// [`MIN_FLUSH_WINDOW`].
#[derive(Debug)]
pub(crate) struct OutputBuffer {
    buf: Vec<u8>,
    capacity: usize,
}

impl OutputBuffer {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity.max(MIN_FLUSH_WINDOW)],
            capacity,
        }
    }

    /// Output window for compressing and finishing.
    pub(crate) fn scratch(&mut self) -> &mut [u8] {
        &mut self.buf[..self.capacity]
    }

    /// Output window for a sync flush.
    pub(crate) fn flush_window(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Write the first `len` bytes to `sink` in full.
    ///
    /// A sink that accepts zero bytes is a short write.
    pub(crate) fn drain_to<W: Write + ?Sized>(&self, len: usize, sink: &mut W) -> Result<()> {
        let mut written = 0;
        while written < len {
            match sink.write(&self.buf[written..len]) {
                Ok(0) => return Err(OxiFlateError::short_write(written, len)),
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

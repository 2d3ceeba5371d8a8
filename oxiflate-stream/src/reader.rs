//! Pull-side adapter: decompress while reading.

use crate::buffer::InputBuffer;
use crate::slot::EngineSlot;
use oxiflate_core::engine::{InflateEngine, Step};
use oxiflate_core::error::{OxiFlateError, Result};
use oxiflate_core::{Header, Options, StatusCode};
use oxiflate_deflate::Inflater;
use std::io::{self, Read};

/// Whether any byte of the current member has been consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Member {
    Idle,
    Active,
}

/// A decompressing reader.
///
/// Reads compressed bytes from `R` into a fixed-size input buffer and hands
/// them to the engine one step at a time. Consecutive members (for example
/// concatenated `.gz` files) are decoded back to back; the engine is reset at
/// every member boundary.
///
/// Upstream `Ok(0)` is end of data. End of data between members is a clean
/// end of stream; end of data inside a member is a
/// [`TruncatedStream`](OxiFlateError::TruncatedStream) error. Interrupted
/// upstream reads are retried.
///
/// Engine errors are sticky: once a read has failed, every later read returns
/// the same error. Upstream I/O errors are passed through and the read may be
/// retried.
///
/// # Example
///
/// ```rust
/// use oxiflate_stream::{GzReader, compress_to_vec};
/// use oxiflate_core::Options;
/// use std::io::Read;
///
/// let compressed = compress_to_vec(b"Blah", Options::default()).unwrap();
/// let mut reader = GzReader::new(&compressed[..]).unwrap();
/// let mut out = String::new();
/// reader.read_to_string(&mut out).unwrap();
/// assert_eq!(out, "Blah");
/// reader.close().unwrap();
/// ```
pub struct GzReader<R, E: InflateEngine = Inflater> {
    source: R,
    engine: EngineSlot<E>,
    input: InputBuffer,
    options: Options,
    capture: bool,
    member: Member,
    eof: bool,
    finished: bool,
    error: Option<OxiFlateError>,
    total_in: u64,
    total_out: u64,
    members: u64,
}

impl<R: Read> GzReader<R, Inflater> {
    /// Create a reader with default options (gzip, zlib auto-detected).
    pub fn new(source: R) -> Result<Self> {
        Self::with_options(source, Options::default())
    }

    /// Create a reader with the given options.
    pub fn with_options(source: R, options: Options) -> Result<Self> {
        let engine = Inflater::from_options(&options)?;
        Self::with_engine(source, engine, options)
    }
}

impl<R: Read, E: InflateEngine> GzReader<R, E> {
    /// Create a reader around an existing engine.
    pub fn with_engine(source: R, mut engine: E, options: Options) -> Result<Self> {
        options.validate()?;
        let capture =
            options.capture_header && engine.enable_header_capture() == StatusCode::OK;
        let input = InputBuffer::with_capacity(options.effective_buffer_size());

        tracing::debug!(
            format = ?options.format,
            buffer = input.capacity(),
            capture,
            "created reader"
        );

        Ok(Self {
            source,
            engine: EngineSlot::new(engine, <E as InflateEngine>::end, "reader", false),
            input,
            options,
            capture,
            member: Member::Idle,
            eof: false,
            finished: false,
            error: None,
            total_in: 0,
            total_out: 0,
            members: 0,
        })
    }

    /// Header of the most recently started gzip member.
    ///
    /// Fails with a usage error when header capture is disabled, the stream
    /// has no gzip header (raw DEFLATE), no header has been parsed yet, or
    /// the reader is closed.
    pub fn header(&self) -> Result<Header> {
        if !self.capture {
            return Err(OxiFlateError::usage("header capture is not enabled"));
        }
        let engine = self
            .engine
            .get()
            .ok_or_else(|| OxiFlateError::usage("reader is closed"))?;
        engine
            .header()
            .cloned()
            .ok_or_else(|| OxiFlateError::usage("no gzip header has been read yet"))
    }

    /// Release the engine.
    ///
    /// Returns the sticky error if one was observed, otherwise the result of
    /// ending the engine. Calling `close` again returns the same result.
    pub fn close(&mut self) -> Result<()> {
        if let Some(status) = self.engine.release() {
            if self.error.is_none() {
                if let Err(e) = status.check() {
                    self.error = Some(e);
                }
            }
            tracing::debug!(
                total_in = self.total_in,
                total_out = self.total_out,
                members = self.members,
                "reader closed"
            );
        }
        match &self.error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    /// Options the reader was created with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Compressed bytes consumed so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Decompressed bytes produced so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Number of members decoded to completion.
    pub fn members(&self) -> u64 {
        self.members
    }

    /// Reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.source
    }

    /// Mutable reference to the underlying reader.
    ///
    /// Reading from it directly corrupts the decompression state.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.source
    }

    /// Release the engine and return the underlying reader.
    ///
    /// Buffered compressed bytes not yet consumed are lost.
    pub fn into_inner(mut self) -> R {
        let _ = self.close();
        let Self { source, .. } = self;
        source
    }

    /// Decompress into `buf`, recording engine errors as sticky.
    pub(crate) fn read_checked(&mut self, buf: &mut [u8]) -> Result<usize> {
        if let Some(e) = &self.error {
            return Err(e.clone());
        }
        match self.read_inner(buf) {
            Err(OxiFlateError::Io(e)) => Err(OxiFlateError::Io(e)),
            Err(e) => {
                tracing::debug!(error = %e, total_in = self.total_in, "read failed");
                self.error = Some(e.clone());
                Err(e)
            }
            ok => ok,
        }
    }

    fn read_inner(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.engine.is_released() {
            return if self.finished {
                Ok(0)
            } else {
                Err(OxiFlateError::usage("read after close"))
            };
        }
        if buf.is_empty() {
            return Ok(0);
        }
        let Some(engine) = self.engine.get_mut() else {
            return Err(OxiFlateError::usage("read after close"));
        };

        let mut produced = 0;
        loop {
            if self.input.is_drained() && !self.eof {
                if produced > 0 {
                    return Ok(produced);
                }
                if self.input.refill(&mut self.source)? == 0 {
                    tracing::trace!(total_in = self.total_in, "upstream reached end of data");
                    self.eof = true;
                }
            }

            let at_eof = self.eof && self.input.is_drained();
            if at_eof && self.member == Member::Idle {
                self.finished = true;
                return Ok(produced);
            }

            let step = engine.step(self.input.pending(), &mut buf[produced..]);
            self.input.consume(step.consumed);
            self.total_in += step.consumed as u64;
            self.total_out += step.produced as u64;
            produced += step.produced;
            if step.consumed > 0 {
                self.member = Member::Active;
            }

            match step.status {
                StatusCode::STREAM_END => {
                    self.members += 1;
                    tracing::debug!(
                        member = self.members,
                        total_in = self.total_in,
                        total_out = self.total_out,
                        "member complete"
                    );
                    engine.reset().check()?;
                    self.member = Member::Idle;
                    if produced > 0 {
                        return Ok(produced);
                    }
                }
                StatusCode::OK | StatusCode::BUF_ERROR => {
                    if !step.made_progress() {
                        if at_eof {
                            return Err(OxiFlateError::truncated(self.total_in));
                        }
                        if !self.input.is_drained() {
                            return Err(OxiFlateError::BufferTooSmall);
                        }
                    }
                }
                _ => return Err(step_error(step)),
            }

            if produced == buf.len() {
                return Ok(produced);
            }
        }
    }
}

/// Translate a failed step, keeping the engine's detail message.
fn step_error(step: Step) -> OxiFlateError {
    match (step.status.translate(), step.message) {
        (Err(OxiFlateError::DataCorrupt { .. }), Some(message)) => {
            OxiFlateError::corrupted(message)
        }
        (Err(e), _) => e,
        (Ok(_), _) => OxiFlateError::StreamState,
    }
}

impl<R: Read, E: InflateEngine> Read for GzReader<R, E> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_checked(buf).map_err(io::Error::from)
    }
}

impl<R, E: InflateEngine> std::fmt::Debug for GzReader<R, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GzReader")
            .field("options", &self.options)
            .field("member", &self.member)
            .field("eof", &self.eof)
            .field("closed", &self.engine.is_released())
            .field("total_in", &self.total_in)
            .field("total_out", &self.total_out)
            .field("members", &self.members)
            .finish_non_exhaustive()
    }
}

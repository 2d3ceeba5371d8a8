//! Push-side adapter: compress while writing.

use crate::buffer::OutputBuffer;
use crate::slot::EngineSlot;
use oxiflate_core::engine::{DeflateEngine, FlushMode, Step};
use oxiflate_core::error::{OxiFlateError, Result};
use oxiflate_core::{Header, Options, StatusCode};
use oxiflate_deflate::Deflater;
use std::io::{self, Write};

/// A compressing writer.
///
/// Every `write` hands the whole slice to the engine and drains the
/// compressed output to `W` before returning. Nothing reaches `W` beyond what
/// the engine has produced until [`GzWriter::close`] (or
/// [`GzWriter::finish`]) writes the final blocks and trailer.
///
/// Dropping the writer without closing it releases the engine without
/// writing a trailer; the output is then incomplete.
///
/// # Example
///
/// ```rust
/// use oxiflate_stream::GzWriter;
/// use oxiflate_core::Header;
/// use std::io::Write;
///
/// let mut writer = GzWriter::new(Vec::new()).unwrap();
/// writer.set_header(&Header::new().with_filename("blah.txt")).unwrap();
/// writer.write_all(b"Blah").unwrap();
/// let compressed = writer.finish().unwrap();
/// assert_eq!(&compressed[..2], &[0x1f, 0x8b]);
/// ```
pub struct GzWriter<W: Write, E: DeflateEngine = Deflater> {
    sink: W,
    engine: EngineSlot<E>,
    output: OutputBuffer,
    options: Options,
    started: bool,
    error: Option<OxiFlateError>,
    total_in: u64,
    total_out: u64,
}

impl<W: Write> GzWriter<W, Deflater> {
    /// Create a gzip writer with default options.
    pub fn new(sink: W) -> Result<Self> {
        Self::with_options(sink, Options::default())
    }

    /// Create a writer with the given options.
    pub fn with_options(sink: W, options: Options) -> Result<Self> {
        let engine = Deflater::new(&options)?;
        Self::with_engine(sink, engine, options)
    }
}

impl<W: Write, E: DeflateEngine> GzWriter<W, E> {
    /// Create a writer around an existing engine.
    pub fn with_engine(sink: W, engine: E, options: Options) -> Result<Self> {
        options.validate()?;
        let output = OutputBuffer::with_capacity(options.effective_buffer_size());

        tracing::debug!(
            format = ?options.format,
            level = options.effective_level(),
            buffer = output.capacity(),
            "created writer"
        );

        Ok(Self {
            sink,
            engine: EngineSlot::new(engine, <E as DeflateEngine>::end, "writer", true),
            output,
            options,
            started: false,
            error: None,
            total_in: 0,
            total_out: 0,
        })
    }

    /// Set the gzip header written at the start of the stream.
    ///
    /// Only allowed before the first write, flush or close, and only for
    /// gzip output.
    pub fn set_header(&mut self, header: &Header) -> Result<()> {
        let Some(engine) = self.engine.get_mut() else {
            return Err(OxiFlateError::usage("writer is closed"));
        };
        if self.started {
            return Err(OxiFlateError::usage(
                "header must be set before any data is written",
            ));
        }
        header.validate()?;
        match engine.set_header(header) {
            StatusCode::STREAM_ERROR => Err(OxiFlateError::usage(
                "header is only supported for gzip output",
            )),
            status => {
                status.check()?;
                tracing::debug!(
                    filename = ?header.filename_field(),
                    os = header.os,
                    "gzip header set"
                );
                Ok(())
            }
        }
    }

    /// Finish the stream and release the engine.
    ///
    /// Steps the engine with the finish flag until it reports stream end,
    /// draining output to the sink each time, then flushes the sink. After a
    /// successful close a second call is a no-op; after a failed one every
    /// later call returns the same error.
    pub fn close(&mut self) -> Result<()> {
        if let Some(e) = &self.error {
            let e = e.clone();
            self.engine.release();
            return Err(e);
        }
        if self.engine.is_released() {
            return Ok(());
        }

        let result = self.checked(|w| w.drive(&[], FlushMode::Finish));
        let status = self.engine.release();
        result?;
        self.checked(|w| {
            if let Some(status) = status {
                status.check()?;
            }
            w.sink.flush()?;
            Ok(())
        })?;

        tracing::debug!(
            total_in = self.total_in,
            total_out = self.total_out,
            "writer closed"
        );
        Ok(())
    }

    /// Close the stream and return the sink.
    ///
    /// Fails with the recorded error if an earlier close failed.
    pub fn finish(mut self) -> Result<W> {
        self.close()?;
        let Self { sink, .. } = self;
        Ok(sink)
    }

    /// Options the writer was created with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Uncompressed bytes accepted so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Compressed bytes written to the sink so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Mutable reference to the underlying writer.
    ///
    /// Writing to it directly corrupts the compressed stream.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Compress the whole of `buf`, recording failures as sticky.
    pub(crate) fn write_checked(&mut self, buf: &[u8]) -> Result<usize> {
        if self.error.is_none() && self.engine.is_released() {
            return Err(OxiFlateError::usage("write after close"));
        }
        self.checked(|w| {
            if buf.is_empty() {
                return Ok(0);
            }
            w.drive(buf, FlushMode::None)?;
            Ok(buf.len())
        })
    }

    /// Sync-flush the engine and flush the sink.
    pub(crate) fn flush_checked(&mut self) -> Result<()> {
        self.checked(|w| {
            if !w.engine.is_released() {
                w.drive(&[], FlushMode::Sync)?;
            }
            w.sink.flush()?;
            Ok(())
        })
    }

    fn checked<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if let Some(e) = &self.error {
            return Err(e.clone());
        }
        let result = op(self);
        if let Err(e) = &result {
            tracing::debug!(error = %e, total_in = self.total_in, "write failed");
            self.error = Some(e.clone());
        }
        result
    }

    /// Step the engine over `input` with `flush` and drain every step.
    ///
    /// Returns once the input is consumed and, for a sync flush, a step
    /// leaves part of the flush window unused; for finish, once the stream
    /// has ended.
    fn drive(&mut self, input: &[u8], flush: FlushMode) -> Result<()> {
        let Some(engine) = self.engine.get_mut() else {
            return Err(OxiFlateError::usage("writer is closed"));
        };
        self.started = true;

        let mut pos = 0;
        loop {
            let window = match flush {
                FlushMode::Sync => self.output.flush_window(),
                FlushMode::None | FlushMode::Finish => self.output.scratch(),
            };
            let window_len = window.len();
            let step = engine.step(&input[pos..], window, flush);
            pos += step.consumed;
            self.total_in += step.consumed as u64;
            self.output.drain_to(step.produced, &mut self.sink)?;
            self.total_out += step.produced as u64;

            match step.status {
                StatusCode::STREAM_END if flush == FlushMode::Finish => return Ok(()),
                StatusCode::OK | StatusCode::BUF_ERROR => {
                    if !step.made_progress() {
                        if pos == input.len() && flush != FlushMode::Finish {
                            // Nothing left to consume or flush.
                            return Ok(());
                        }
                        return Err(OxiFlateError::BufferTooSmall);
                    }
                }
                StatusCode::STREAM_END => return Err(OxiFlateError::StreamState),
                _ => return Err(step_error(step)),
            }

            if pos == input.len() {
                match flush {
                    FlushMode::None => return Ok(()),
                    FlushMode::Sync if step.produced < window_len => return Ok(()),
                    _ => {}
                }
            }
        }
    }
}

fn step_error(step: Step) -> OxiFlateError {
    match (step.status.translate(), step.message) {
        (Err(OxiFlateError::DataCorrupt { .. }), Some(message)) => {
            OxiFlateError::corrupted(message)
        }
        (Err(e), _) => e,
        (Ok(_), _) => OxiFlateError::StreamState,
    }
}

impl<W: Write, E: DeflateEngine> Write for GzWriter<W, E> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_checked(buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_checked().map_err(io::Error::from)
    }
}

impl<W: Write, E: DeflateEngine> std::fmt::Debug for GzWriter<W, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GzWriter")
            .field("options", &self.options)
            .field("started", &self.started)
            .field("closed", &self.engine.is_released())
            .field("total_in", &self.total_in)
            .field("total_out", &self.total_out)
            .finish_non_exhaustive()
    }
}

//! Streaming compression engine.
//!
//! [`Deflater`] wraps a `flate2` compressor and emits one member in the
//! configured framing. For gzip it writes the header before the first
//! compressed byte and appends the CRC-32/ISIZE trailer after the final
//! block; zlib framing is produced by `flate2` itself.

use crate::gzip;
use crc32fast::Hasher;
use flate2::{Compress, Compression, FlushCompress, Status};
use oxiflate_core::engine::{DeflateEngine, FlushMode, Step};
use oxiflate_core::error::{OxiFlateError, Result};
use oxiflate_core::options::{DEFAULT_MEM_LEVEL, Framing, Options, Strategy};
use oxiflate_core::{Header, StatusCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Gzip header bytes are pending.
    Header,
    /// Compressing.
    Body,
    /// Gzip trailer bytes are pending.
    Trailer,
    /// Stream complete.
    Done,
}

/// DEFLATE compressor producing gzip, zlib or raw streams.
pub struct Deflater {
    framing: Framing,
    level: u32,
    window_bits: u8,
    inner: Compress,
    header: Header,
    /// Serialized header or trailer still to be written, and its cursor.
    pending: Vec<u8>,
    pending_pos: usize,
    phase: Phase,
    started: bool,
    crc: Hasher,
    size: u32,
    ended: bool,
}

impl std::fmt::Debug for Deflater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deflater")
            .field("framing", &self.framing)
            .field("level", &self.level)
            .field("window_bits", &self.window_bits)
            .field("phase", &self.phase)
            .field("total_in", &self.inner.total_in())
            .field("total_out", &self.inner.total_out())
            .field("ended", &self.ended)
            .finish()
    }
}

impl Deflater {
    /// Create a compressor from adapter options.
    ///
    /// Window bits select the framing and window size (see
    /// [`Options::encode_framing`]). As in zlib, an 8-bit window is widened
    /// to 9 bits for zlib framing and rejected for raw and gzip framing.
    /// The backend has a fixed memory level and match strategy, so any
    /// other memory level or strategy is a configuration error.
    pub fn new(options: &Options) -> Result<Self> {
        options.validate()?;
        let (framing, window_bits) = options.encode_framing()?;
        let window_bits = match window_bits {
            8 if framing == Framing::Zlib => 9,
            8 => {
                return Err(OxiFlateError::config(format!(
                    "window bits 8 requires zlib framing, not {framing:?}"
                )));
            }
            bits => bits,
        };
        if let Some(mem_level) = options.mem_level.filter(|&m| m != DEFAULT_MEM_LEVEL) {
            return Err(OxiFlateError::config(format!(
                "memory level {mem_level} is not supported (only {DEFAULT_MEM_LEVEL})"
            )));
        }
        if let Some(strategy) = options.strategy.filter(|&s| s != Strategy::Default) {
            return Err(OxiFlateError::config(format!(
                "strategy {strategy:?} is not supported"
            )));
        }
        let level = options.effective_level();

        tracing::debug!(?framing, level, window_bits, "creating deflater");

        Ok(Self {
            framing,
            level,
            window_bits,
            inner: Compress::new_with_window_bits(
                Compression::new(level),
                framing == Framing::Zlib,
                window_bits,
            ),
            header: Header::default(),
            pending: Vec::new(),
            pending_pos: 0,
            phase: if framing == Framing::Gzip {
                Phase::Header
            } else {
                Phase::Body
            },
            started: false,
            crc: Hasher::new(),
            size: 0,
            ended: false,
        })
    }

    /// Output framing.
    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Effective compression level.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Window size exponent in use.
    pub fn window_bits(&self) -> u8 {
        self.window_bits
    }

    /// Copy pending header/trailer bytes; returns true once all are written.
    fn drain_pending(&mut self, output: &mut [u8], out_pos: &mut usize) -> bool {
        let rest = &self.pending[self.pending_pos..];
        let n = rest.len().min(output.len() - *out_pos);
        output[*out_pos..*out_pos + n].copy_from_slice(&rest[..n]);
        self.pending_pos += n;
        *out_pos += n;
        self.pending_pos == self.pending.len()
    }

    fn set_pending(&mut self, bytes: Vec<u8>) {
        self.pending = bytes;
        self.pending_pos = 0;
    }
}

fn flush_compress(flush: FlushMode) -> FlushCompress {
    match flush {
        FlushMode::None => FlushCompress::None,
        FlushMode::Sync => FlushCompress::Sync,
        FlushMode::Finish => FlushCompress::Finish,
    }
}

impl DeflateEngine for Deflater {
    fn step(&mut self, input: &[u8], output: &mut [u8], flush: FlushMode) -> Step {
        if self.ended {
            return Step::failed(0, 0, StatusCode::STREAM_ERROR, "engine already ended");
        }
        if !self.started {
            self.started = true;
            if self.phase == Phase::Header {
                match gzip::encode_header(&self.header, self.level) {
                    Ok(bytes) => self.set_pending(bytes),
                    Err(e) => {
                        return Step::failed(0, 0, StatusCode::STREAM_ERROR, e.to_string());
                    }
                }
            }
        }

        let mut in_pos = 0;
        let mut out_pos = 0;

        loop {
            match self.phase {
                Phase::Header => {
                    if !self.drain_pending(output, &mut out_pos) {
                        break;
                    }
                    self.phase = Phase::Body;
                }
                Phase::Body => {
                    let before_in = self.inner.total_in();
                    let before_out = self.inner.total_out();
                    let res = self.inner.compress(
                        &input[in_pos..],
                        &mut output[out_pos..],
                        flush_compress(flush),
                    );
                    let consumed = (self.inner.total_in() - before_in) as usize;
                    let produced = (self.inner.total_out() - before_out) as usize;
                    if self.framing == Framing::Gzip {
                        self.crc.update(&input[in_pos..in_pos + consumed]);
                        self.size = self.size.wrapping_add(consumed as u32);
                    }
                    in_pos += consumed;
                    out_pos += produced;

                    match res {
                        Ok(Status::StreamEnd) => {
                            if self.framing == Framing::Gzip {
                                let crc = self.crc.clone().finalize();
                                self.set_pending(gzip::encode_trailer(crc, self.size).to_vec());
                                self.phase = Phase::Trailer;
                            } else {
                                self.phase = Phase::Done;
                            }
                        }
                        Ok(Status::Ok) | Ok(Status::BufError) => break,
                        Err(e) => {
                            return Step::failed(
                                in_pos,
                                out_pos,
                                StatusCode::STREAM_ERROR,
                                e.to_string(),
                            );
                        }
                    }
                }
                Phase::Trailer => {
                    if !self.drain_pending(output, &mut out_pos) {
                        break;
                    }
                    self.phase = Phase::Done;
                }
                Phase::Done => {
                    tracing::trace!(
                        total_in = self.inner.total_in(),
                        total_out = self.inner.total_out(),
                        "deflate stream complete"
                    );
                    return Step::new(in_pos, out_pos, StatusCode::STREAM_END);
                }
            }
        }

        if in_pos == 0 && out_pos == 0 {
            Step::new(0, 0, StatusCode::BUF_ERROR)
        } else {
            Step::new(in_pos, out_pos, StatusCode::OK)
        }
    }

    fn set_header(&mut self, header: &Header) -> StatusCode {
        if self.ended || self.started || self.framing != Framing::Gzip {
            return StatusCode::STREAM_ERROR;
        }
        if header.validate().is_err() {
            return StatusCode::STREAM_ERROR;
        }
        self.header = header.clone();
        StatusCode::OK
    }

    fn end(&mut self) -> StatusCode {
        if self.ended {
            return StatusCode::STREAM_ERROR;
        }
        self.ended = true;
        StatusCode::OK
    }
}

/// Compress a complete buffer into a single member.
pub fn deflate(data: &[u8], options: &Options) -> Result<Vec<u8>> {
    let mut deflater = Deflater::new(options)?;
    let mut output = Vec::new();
    let mut buffer = vec![0u8; 32768];
    let mut pos = 0;

    loop {
        let step = deflater.step(&data[pos..], &mut buffer, FlushMode::Finish);
        pos += step.consumed;
        output.extend_from_slice(&buffer[..step.produced]);
        if step.status == StatusCode::STREAM_END {
            break;
        }
        step.status.check()?;
    }

    deflater.end().check()?;
    Ok(output)
}

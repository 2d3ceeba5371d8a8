//! Streaming decompression engine.
//!
//! [`Inflater`] drives a raw DEFLATE decoder from `flate2` and handles the
//! member framing around it: gzip header parsing and trailer verification,
//! zlib header/Adler-32 (delegated to `flate2`), or no framing at all.
//!
//! The engine decodes exactly one member between resets. It reports
//! `STREAM_END` once the member trailer is verified and never consumes bytes
//! belonging to the next member.

use crate::gzip::{self, GZIP_MAGIC, HeaderParser, TRAILER_LEN};
use crc32fast::Hasher;
use flate2::{Decompress, FlushDecompress, Status};
use oxiflate_core::engine::{InflateEngine, Step};
use oxiflate_core::error::Result;
use oxiflate_core::options::{Framing, Options};
use oxiflate_core::{Header, StatusCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Waiting for the first byte of an auto-detected member.
    Detect,
    /// Parsing a gzip member header.
    Header,
    /// Decoding DEFLATE blocks.
    Body,
    /// Collecting the gzip trailer.
    Trailer,
    /// Member complete; a reset is required.
    Done,
}

/// DEFLATE decompressor with gzip/zlib/raw member framing.
pub struct Inflater {
    /// Configured framing (Auto re-detects on every member).
    framing: Framing,
    /// Framing of the member being decoded.
    member: Framing,
    phase: Phase,
    inner: Decompress,
    parser: HeaderParser,
    crc: Hasher,
    size: u32,
    trailer: [u8; TRAILER_LEN],
    trailer_len: usize,
    capture: bool,
    header: Option<Header>,
    ended: bool,
}

impl std::fmt::Debug for Inflater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inflater")
            .field("framing", &self.framing)
            .field("member", &self.member)
            .field("phase", &self.phase)
            .field("total_in", &self.inner.total_in())
            .field("total_out", &self.inner.total_out())
            .field("capture", &self.capture)
            .field("ended", &self.ended)
            .finish()
    }
}

impl Inflater {
    /// Create a decompressor for the given framing.
    pub fn new(framing: Framing) -> Self {
        let mut inflater = Self {
            framing,
            member: framing,
            phase: Phase::Detect,
            inner: Decompress::new(framing == Framing::Zlib),
            parser: HeaderParser::new(),
            crc: Hasher::new(),
            size: 0,
            trailer: [0; TRAILER_LEN],
            trailer_len: 0,
            capture: false,
            header: None,
            ended: false,
        };
        inflater.start_member();
        inflater
    }

    /// Create a decompressor from adapter options.
    pub fn from_options(options: &Options) -> Result<Self> {
        options.validate()?;
        Ok(Self::new(options.decode_framing()))
    }

    /// Configured framing.
    pub fn framing(&self) -> Framing {
        self.framing
    }

    fn start_member(&mut self) {
        self.member = self.framing;
        self.phase = match self.framing {
            Framing::Auto => Phase::Detect,
            Framing::Gzip => Phase::Header,
            Framing::Zlib | Framing::Raw => Phase::Body,
        };
        self.inner.reset(self.framing == Framing::Zlib);
        self.parser.reset();
        self.crc = Hasher::new();
        self.size = 0;
        self.trailer_len = 0;
    }

    fn detect(&mut self, first: u8) {
        if first == GZIP_MAGIC[0] {
            self.member = Framing::Gzip;
            self.phase = Phase::Header;
        } else {
            self.member = Framing::Zlib;
            self.inner.reset(true);
            self.phase = Phase::Body;
        }
        tracing::trace!(member = ?self.member, "detected member framing");
    }
}

impl InflateEngine for Inflater {
    fn step(&mut self, input: &[u8], output: &mut [u8]) -> Step {
        if self.ended {
            return Step::failed(0, 0, StatusCode::STREAM_ERROR, "engine already ended");
        }

        let mut in_pos = 0;
        let mut out_pos = 0;

        loop {
            match self.phase {
                Phase::Detect => {
                    let Some(&first) = input.get(in_pos) else {
                        break;
                    };
                    self.detect(first);
                }
                Phase::Header => match self.parser.parse(&input[in_pos..]) {
                    Ok(used) => {
                        in_pos += used;
                        if !self.parser.is_done() {
                            break;
                        }
                        let header = self.parser.take_header();
                        tracing::debug!(
                            filename = ?header.filename,
                            os = header.os,
                            "parsed gzip member header"
                        );
                        if self.capture {
                            self.header = Some(header);
                        }
                        self.inner.reset(false);
                        self.phase = Phase::Body;
                    }
                    Err(e) => {
                        return Step::failed(in_pos, out_pos, StatusCode::DATA_ERROR, e.to_string());
                    }
                },
                Phase::Body => {
                    let before_in = self.inner.total_in();
                    let before_out = self.inner.total_out();
                    let res = self.inner.decompress(
                        &input[in_pos..],
                        &mut output[out_pos..],
                        FlushDecompress::None,
                    );
                    let consumed = (self.inner.total_in() - before_in) as usize;
                    let produced = (self.inner.total_out() - before_out) as usize;
                    if self.member == Framing::Gzip {
                        self.crc.update(&output[out_pos..out_pos + produced]);
                        self.size = self.size.wrapping_add(produced as u32);
                    }
                    in_pos += consumed;
                    out_pos += produced;

                    match res {
                        Ok(Status::StreamEnd) => {
                            if self.member == Framing::Gzip {
                                self.phase = Phase::Trailer;
                            } else {
                                self.phase = Phase::Done;
                                return Step::new(in_pos, out_pos, StatusCode::STREAM_END);
                            }
                        }
                        Ok(Status::Ok) | Ok(Status::BufError) => break,
                        Err(e) => {
                            return Step::failed(
                                in_pos,
                                out_pos,
                                StatusCode::DATA_ERROR,
                                e.to_string(),
                            );
                        }
                    }
                }
                Phase::Trailer => {
                    let rest = &input[in_pos..];
                    let take = rest.len().min(TRAILER_LEN - self.trailer_len);
                    self.trailer[self.trailer_len..self.trailer_len + take]
                        .copy_from_slice(&rest[..take]);
                    self.trailer_len += take;
                    in_pos += take;
                    if self.trailer_len < TRAILER_LEN {
                        break;
                    }
                    let crc = self.crc.clone().finalize();
                    if let Err(e) = gzip::verify_trailer(&self.trailer, crc, self.size) {
                        return Step::failed(in_pos, out_pos, StatusCode::DATA_ERROR, e.to_string());
                    }
                    self.phase = Phase::Done;
                    return Step::new(in_pos, out_pos, StatusCode::STREAM_END);
                }
                Phase::Done => {
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

    fn reset(&mut self) -> StatusCode {
        if self.ended {
            return StatusCode::STREAM_ERROR;
        }
        self.start_member();
        StatusCode::OK
    }

    fn enable_header_capture(&mut self) -> StatusCode {
        if self.framing.has_header() {
            self.capture = true;
            StatusCode::OK
        } else {
            StatusCode::STREAM_ERROR
        }
    }

    fn header(&self) -> Option<&Header> {
        if self.capture { self.header.as_ref() } else { None }
    }

    fn end(&mut self) -> StatusCode {
        if self.ended {
            return StatusCode::STREAM_ERROR;
        }
        self.ended = true;
        self.header = None;
        StatusCode::OK
    }
}

/// Decompress a complete buffer (all members) with the given framing.
pub fn inflate(data: &[u8], framing: Framing) -> Result<Vec<u8>> {
    let mut inflater = Inflater::new(framing);
    let mut output = Vec::new();
    let mut buffer = vec![0u8; 32768];
    let mut pos = 0;
    let mut member_started = false;

    loop {
        let step = inflater.step(&data[pos..], &mut buffer);
        pos += step.consumed;
        output.extend_from_slice(&buffer[..step.produced]);
        member_started |= step.consumed > 0;

        match step.status {
            StatusCode::STREAM_END => {
                inflater.reset().check()?;
                member_started = false;
                if pos == data.len() {
                    break;
                }
            }
            StatusCode::BUF_ERROR if pos == data.len() => {
                if member_started {
                    return Err(oxiflate_core::OxiFlateError::truncated(pos as u64));
                }
                break;
            }
            status => {
                if let Err(e) = status.translate() {
                    return Err(match (e, step.message) {
                        (oxiflate_core::OxiFlateError::DataCorrupt { .. }, Some(msg)) => {
                            oxiflate_core::OxiFlateError::corrupted(msg)
                        }
                        (e, _) => e,
                    });
                }
            }
        }
    }

    Ok(output)
}

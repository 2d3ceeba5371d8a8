//! GZIP member header and trailer wire format (RFC 1952).
//!
//! ```text
//! +---+---+---+---+---+---+---+---+---+---+
//! |ID1|ID2|CM |FLG|     MTIME     |XFL|OS |
//! +---+---+---+---+---+---+---+---+---+---+
//! (if FEXTRA)   XLEN(2) + XLEN bytes
//! (if FNAME)    zero-terminated file name
//! (if FCOMMENT) zero-terminated comment
//! (if FHCRC)    CRC16 of the header so far
//! ...compressed blocks...
//! +---+---+---+---+---+---+---+---+
//! |     CRC32     |     ISIZE     |
//! +---+---+---+---+---+---+---+---+
//! ```
//!
//! The header parser is incremental: it accepts input in arbitrarily small
//! pieces and reports how much of each piece it used, so the engine can stop
//! at the exact byte where the compressed blocks begin.

use crc32fast::Hasher;
use oxiflate_core::Header;
use oxiflate_core::error::{OxiFlateError, Result};

/// GZIP magic bytes.
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// GZIP compression method: DEFLATE.
pub const CM_DEFLATE: u8 = 8;

/// Size of the fixed part of the header.
pub const FIXED_HEADER_LEN: usize = 10;

/// Size of the member trailer.
pub const TRAILER_LEN: usize = 8;

/// Upper bound for a zero-terminated header field.
pub const MAX_STRING_FIELD: usize = 64 * 1024;

/// GZIP header flags.
pub mod flags {
    /// Text file.
    pub const FTEXT: u8 = 0x01;
    /// Header CRC present.
    pub const FHCRC: u8 = 0x02;
    /// Extra field present.
    pub const FEXTRA: u8 = 0x04;
    /// Original filename present.
    pub const FNAME: u8 = 0x08;
    /// Comment present.
    pub const FCOMMENT: u8 = 0x10;
    /// Bits that must be zero.
    pub const RESERVED: u8 = 0xE0;
}

/// XFL value advertised for a compression level.
pub fn xfl_for_level(level: u32) -> u8 {
    match level {
        0..=1 => 4, // Fastest
        9 => 2,     // Maximum compression
        _ => 0,
    }
}

/// Serialize a member header.
///
/// Empty optional fields are omitted, exactly like unset ones.
pub fn encode_header(header: &Header, level: u32) -> Result<Vec<u8>> {
    header.validate()?;

    let mut flg = 0u8;
    let mut out = Vec::with_capacity(FIXED_HEADER_LEN);
    out.extend_from_slice(&GZIP_MAGIC);
    out.push(CM_DEFLATE);
    out.push(0); // flags, patched below
    out.extend_from_slice(&header.mtime_unix()?.to_le_bytes());
    out.push(xfl_for_level(level));
    out.push(header.os);

    if let Some(extra) = header.extra_field() {
        flg |= flags::FEXTRA;
        out.extend_from_slice(&(extra.len() as u16).to_le_bytes());
        out.extend_from_slice(extra);
    }
    if let Some(name) = header.filename_field() {
        flg |= flags::FNAME;
        out.extend_from_slice(name.as_bytes());
        out.push(0);
    }
    if let Some(comment) = header.comment_field() {
        flg |= flags::FCOMMENT;
        out.extend_from_slice(comment.as_bytes());
        out.push(0);
    }
    out[3] = flg;

    Ok(out)
}

/// Serialize a member trailer.
pub fn encode_trailer(crc: u32, size: u32) -> [u8; TRAILER_LEN] {
    let mut out = [0u8; TRAILER_LEN];
    out[..4].copy_from_slice(&crc.to_le_bytes());
    out[4..].copy_from_slice(&size.to_le_bytes());
    out
}

/// Check a member trailer against the observed checksum and size.
pub fn verify_trailer(trailer: &[u8; TRAILER_LEN], crc: u32, size: u32) -> Result<()> {
    let expected_crc = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    let expected_size = u32::from_le_bytes([trailer[4], trailer[5], trailer[6], trailer[7]]);
    if expected_crc != crc {
        return Err(OxiFlateError::corrupted(format!(
            "CRC mismatch: expected {expected_crc:#x}, computed {crc:#x}"
        )));
    }
    if expected_size != size {
        return Err(OxiFlateError::corrupted(format!(
            "size mismatch: expected {expected_size}, got {size}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Fixed,
    ExtraLen,
    Extra,
    Filename,
    Comment,
    HeaderCrc,
    Done,
}

/// Incremental gzip header parser.
#[derive(Debug)]
pub struct HeaderParser {
    state: State,
    /// Bytes of the field being assembled.
    field: Vec<u8>,
    flags: u8,
    extra_len: usize,
    header: Header,
    crc: Hasher,
}

impl Default for HeaderParser {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderParser {
    /// Create a parser positioned at the first magic byte.
    pub fn new() -> Self {
        Self {
            state: State::Fixed,
            field: Vec::with_capacity(FIXED_HEADER_LEN),
            flags: 0,
            extra_len: 0,
            header: Header::default(),
            crc: Hasher::new(),
        }
    }

    /// Forget any partially parsed header.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Whether a complete header has been parsed.
    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Take the parsed header. Only meaningful once [`HeaderParser::is_done`].
    pub fn take_header(&mut self) -> Header {
        std::mem::take(&mut self.header)
    }

    /// Consume header bytes from `input`.
    ///
    /// Returns the number of bytes used. Bytes past the end of the header are
    /// never consumed.
    pub fn parse(&mut self, input: &[u8]) -> Result<usize> {
        let mut pos = 0;

        loop {
            match self.state {
                State::Fixed => {
                    if !self.fill(input, &mut pos, FIXED_HEADER_LEN) {
                        return Ok(pos);
                    }
                    self.parse_fixed()?;
                    self.state = self.next_state(State::Fixed);
                }
                State::ExtraLen => {
                    if !self.fill(input, &mut pos, 2) {
                        return Ok(pos);
                    }
                    self.extra_len = u16::from_le_bytes([self.field[0], self.field[1]]) as usize;
                    self.field.clear();
                    self.state = State::Extra;
                }
                State::Extra => {
                    if !self.fill(input, &mut pos, self.extra_len) {
                        return Ok(pos);
                    }
                    let extra = std::mem::take(&mut self.field);
                    // An empty extra field is indistinguishable from none.
                    self.header.extra = (!extra.is_empty()).then_some(extra);
                    self.state = self.next_state(State::Extra);
                }
                State::Filename | State::Comment => {
                    if !self.fill_cstr(input, &mut pos)? {
                        return Ok(pos);
                    }
                    let bytes = std::mem::take(&mut self.field);
                    let text = (!bytes.is_empty())
                        .then(|| String::from_utf8_lossy(&bytes).into_owned());
                    if self.state == State::Filename {
                        self.header.filename = text;
                    } else {
                        self.header.comment = text;
                    }
                    self.state = self.next_state(self.state);
                }
                State::HeaderCrc => {
                    let expected = (self.crc.clone().finalize() & 0xFFFF) as u16;
                    if !self.fill_raw(input, &mut pos, 2) {
                        return Ok(pos);
                    }
                    let stored = u16::from_le_bytes([self.field[0], self.field[1]]);
                    if stored != expected {
                        return Err(OxiFlateError::corrupted(format!(
                            "header CRC mismatch: expected {stored:#06x}, computed {expected:#06x}"
                        )));
                    }
                    self.field.clear();
                    self.state = State::Done;
                }
                State::Done => return Ok(pos),
            }
        }
    }

    fn parse_fixed(&mut self) -> Result<()> {
        let buf = std::mem::take(&mut self.field);
        if buf[0..2] != GZIP_MAGIC {
            return Err(OxiFlateError::corrupted(format!(
                "invalid gzip magic {:02x?}",
                &buf[0..2]
            )));
        }
        if buf[2] != CM_DEFLATE {
            return Err(OxiFlateError::corrupted(format!(
                "unsupported gzip compression method {}",
                buf[2]
            )));
        }
        self.flags = buf[3];
        if self.flags & flags::RESERVED != 0 {
            return Err(OxiFlateError::corrupted(format!(
                "reserved gzip flags set: {:#04x}",
                self.flags
            )));
        }
        let mtime = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
        self.header.mtime = Header::mtime_from_unix(mtime);
        self.header.os = buf[9];
        Ok(())
    }

    fn next_state(&self, current: State) -> State {
        let order = [
            (State::ExtraLen, flags::FEXTRA),
            (State::Filename, flags::FNAME),
            (State::Comment, flags::FCOMMENT),
            (State::HeaderCrc, flags::FHCRC),
        ];
        let rank = |s: State| match s {
            State::Fixed => 0,
            State::ExtraLen | State::Extra => 1,
            State::Filename => 2,
            State::Comment => 3,
            State::HeaderCrc => 4,
            State::Done => 5,
        };
        order
            .iter()
            .find(|(state, flag)| rank(*state) > rank(current) && self.flags & flag != 0)
            .map(|(state, _)| *state)
            .unwrap_or(State::Done)
    }

    /// Accumulate until `self.field` holds `len` bytes, hashing them.
    fn fill(&mut self, input: &[u8], pos: &mut usize, len: usize) -> bool {
        let start = self.field.len();
        let complete = self.fill_raw(input, pos, len);
        self.crc.update(&self.field[start..]);
        complete
    }

    /// Accumulate until `self.field` holds `len` bytes.
    fn fill_raw(&mut self, input: &[u8], pos: &mut usize, len: usize) -> bool {
        let want = len - self.field.len();
        let take = want.min(input.len() - *pos);
        self.field.extend_from_slice(&input[*pos..*pos + take]);
        *pos += take;
        self.field.len() == len
    }

    /// Accumulate a zero-terminated field; the terminator is consumed but not
    /// stored.
    fn fill_cstr(&mut self, input: &[u8], pos: &mut usize) -> Result<bool> {
        let rest = &input[*pos..];
        let (chunk, found) = match rest.iter().position(|&b| b == 0) {
            Some(end) => (&rest[..=end], true),
            None => (rest, false),
        };
        self.crc.update(chunk);
        *pos += chunk.len();
        let body = if found { &chunk[..chunk.len() - 1] } else { chunk };
        self.field.extend_from_slice(body);
        if self.field.len() > MAX_STRING_FIELD {
            return Err(OxiFlateError::corrupted(format!(
                "gzip header string field exceeds {MAX_STRING_FIELD} bytes"
            )));
        }
        Ok(found)
    }
}

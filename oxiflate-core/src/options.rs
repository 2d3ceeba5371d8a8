//! Adapter configuration.
//!
//! [`Options`] is consumed once when an adapter is constructed. Values use the
//! zlib conventions for level, window bits, memory level and strategy so that
//! settings carry over from other zlib-based tools unchanged.

use crate::error::{OxiFlateError, Result};

/// Default size of the adapter's internal buffer (512 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 512 * 1024;

/// Level used when none is given or a negative level is requested.
pub const DEFAULT_LEVEL: u32 = 6;

/// Maximum DEFLATE window size exponent.
pub const MAX_WINDOW_BITS: i32 = 15;

/// Minimum DEFLATE window size exponent.
pub const MIN_WINDOW_BITS: i32 = 8;

/// Default memory level.
pub const DEFAULT_MEM_LEVEL: i32 = 8;

/// Stream format selected through [`Options::format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// RFC 1952 gzip. When decoding, zlib (RFC 1950) streams are also
    /// recognized per member.
    #[default]
    Gzip,
    /// RFC 1951 raw DEFLATE.
    Flate,
}

/// Framing actually put around the DEFLATE data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// No header or trailer.
    Raw,
    /// Two-byte header and Adler-32 trailer.
    Zlib,
    /// Gzip member header and CRC-32/ISIZE trailer.
    Gzip,
    /// Decode only: gzip or zlib, detected from the first byte of each member.
    Auto,
}

impl Framing {
    /// Whether the framing carries a gzip header that can be exchanged.
    pub fn has_header(self) -> bool {
        matches!(self, Self::Gzip | Self::Auto)
    }
}

/// Compression strategy hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Normal matching.
    #[default]
    Default,
    /// Tuned for filtered data (small values with somewhat random distribution).
    Filtered,
    /// Huffman coding only, no string matching.
    HuffmanOnly,
    /// Matches limited to distance one.
    Rle,
    /// Fixed Huffman codes only.
    Fixed,
}

impl Strategy {
    /// zlib numeric value.
    pub fn code(self) -> i32 {
        match self {
            Self::Default => 0,
            Self::Filtered => 1,
            Self::HuffmanOnly => 2,
            Self::Rle => 3,
            Self::Fixed => 4,
        }
    }

    /// Parse a zlib numeric value.
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Self::Default),
            1 => Ok(Self::Filtered),
            2 => Ok(Self::HuffmanOnly),
            3 => Ok(Self::Rle),
            4 => Ok(Self::Fixed),
            _ => Err(OxiFlateError::config(format!("invalid strategy {code}"))),
        }
    }
}

/// Options passed to the reader and writer constructors.
///
/// # Example
///
/// ```rust
/// use oxiflate_core::{Format, Options};
///
/// let opts = Options::new().format(Format::Flate).level(9).buffer_size(64 * 1024);
/// assert!(opts.validate().is_ok());
/// assert_eq!(opts.effective_level(), 9);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Stream format.
    pub format: Format,
    /// Internal buffer size in bytes; 0 selects [`DEFAULT_BUFFER_SIZE`].
    pub buffer_size: usize,
    /// Compression level: `None` or negative for the default, 0 stores, 1-9.
    pub level: Option<i32>,
    /// Encoder window bits (zlib convention); overrides `format` when set.
    pub window_bits: Option<i32>,
    /// Encoder memory level (1-9).
    pub mem_level: Option<i32>,
    /// Encoder strategy.
    pub strategy: Option<Strategy>,
    /// Decoder: retain the gzip header of each member.
    pub capture_header: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            format: Format::Gzip,
            buffer_size: DEFAULT_BUFFER_SIZE,
            level: None,
            window_bits: None,
            mem_level: None,
            strategy: None,
            capture_header: true,
        }
    }
}

impl Options {
    /// Create options with default values (gzip, 512 KiB, default level).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the stream format.
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Set the internal buffer size.
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Set the compression level.
    pub fn level(mut self, level: i32) -> Self {
        self.level = Some(level);
        self
    }

    /// Set encoder window bits.
    pub fn window_bits(mut self, bits: i32) -> Self {
        self.window_bits = Some(bits);
        self
    }

    /// Set encoder memory level.
    pub fn mem_level(mut self, level: i32) -> Self {
        self.mem_level = Some(level);
        self
    }

    /// Set encoder strategy.
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Enable or disable gzip header capture when decoding.
    pub fn capture_header(mut self, capture: bool) -> Self {
        self.capture_header = capture;
        self
    }

    /// Buffer size with 0 normalized to the default.
    pub fn effective_buffer_size(&self) -> usize {
        if self.buffer_size == 0 {
            DEFAULT_BUFFER_SIZE
        } else {
            self.buffer_size
        }
    }

    /// Level in 0-9 with the default substituted.
    ///
    /// Out-of-range positive levels are rejected by [`Options::validate`].
    pub fn effective_level(&self) -> u32 {
        match self.level {
            Some(level) if level >= 0 => level.min(9) as u32,
            _ => DEFAULT_LEVEL,
        }
    }

    /// Framing used by a decoder.
    pub fn decode_framing(&self) -> Framing {
        match self.format {
            Format::Gzip => Framing::Auto,
            Format::Flate => Framing::Raw,
        }
    }

    /// Framing and window size exponent used by an encoder.
    pub fn encode_framing(&self) -> Result<(Framing, u8)> {
        let bits = match self.window_bits {
            Some(bits) => bits,
            None => match self.format {
                Format::Gzip => 16 + MAX_WINDOW_BITS,
                Format::Flate => -MAX_WINDOW_BITS,
            },
        };
        let (framing, size) = match bits {
            b if (MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&b) => (Framing::Zlib, b),
            b if (16 + MIN_WINDOW_BITS..=16 + MAX_WINDOW_BITS).contains(&b) => {
                (Framing::Gzip, b - 16)
            }
            b if (-MAX_WINDOW_BITS..=-MIN_WINDOW_BITS).contains(&b) => (Framing::Raw, -b),
            b => {
                return Err(OxiFlateError::config(format!("invalid window bits {b}")));
            }
        };
        Ok((framing, size as u8))
    }

    /// Check every field for range errors.
    pub fn validate(&self) -> Result<()> {
        if let Some(level) = self.level {
            if level > 9 {
                return Err(OxiFlateError::config(format!(
                    "compression level {level} out of range (expected -1..=9)"
                )));
            }
        }
        if self.window_bits.is_some() {
            self.encode_framing()?;
        }
        if let Some(mem) = self.mem_level {
            if !(1..=9).contains(&mem) {
                return Err(OxiFlateError::config(format!(
                    "memory level {mem} out of range (expected 1..=9)"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = Options::default();
        assert_eq!(opts.format, Format::Gzip);
        assert_eq!(opts.effective_buffer_size(), DEFAULT_BUFFER_SIZE);
        assert_eq!(opts.effective_level(), DEFAULT_LEVEL);
        assert!(opts.capture_header);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_buffer_size_normalized() {
        assert_eq!(
            Options::new().buffer_size(0).effective_buffer_size(),
            DEFAULT_BUFFER_SIZE
        );
        assert_eq!(Options::new().buffer_size(17).effective_buffer_size(), 17);
    }

    #[test]
    fn test_levels() {
        assert_eq!(Options::new().level(0).effective_level(), 0);
        assert_eq!(Options::new().level(-1).effective_level(), DEFAULT_LEVEL);
        assert_eq!(Options::new().level(-42).effective_level(), DEFAULT_LEVEL);
        assert_eq!(Options::new().level(9).effective_level(), 9);
        assert!(Options::new().level(10).validate().is_err());
    }

    #[test]
    fn test_encode_framing_defaults() {
        assert_eq!(
            Options::new().encode_framing().unwrap(),
            (Framing::Gzip, 15)
        );
        assert_eq!(
            Options::new().format(Format::Flate).encode_framing().unwrap(),
            (Framing::Raw, 15)
        );
    }

    #[test]
    fn test_window_bits_override_format() {
        let opts = Options::new().format(Format::Flate).window_bits(15);
        assert_eq!(opts.encode_framing().unwrap(), (Framing::Zlib, 15));

        let opts = Options::new().window_bits(-9);
        assert_eq!(opts.encode_framing().unwrap(), (Framing::Raw, 9));

        let opts = Options::new().format(Format::Flate).window_bits(31);
        assert_eq!(opts.encode_framing().unwrap(), (Framing::Gzip, 15));
    }

    #[test]
    fn test_invalid_window_bits() {
        for bits in [0, 7, 16, 23, 32, 47, -7, -16] {
            let opts = Options::new().window_bits(bits);
            assert!(
                matches!(opts.validate(), Err(OxiFlateError::Config { .. })),
                "window bits {bits} should be rejected"
            );
        }
    }

    #[test]
    fn test_mem_level_and_strategy() {
        assert!(Options::new().mem_level(1).validate().is_ok());
        assert!(Options::new().mem_level(9).validate().is_ok());
        assert!(Options::new().mem_level(0).validate().is_err());
        assert!(Options::new().mem_level(10).validate().is_err());

        for code in 0..=4 {
            assert_eq!(Strategy::from_code(code).unwrap().code(), code);
        }
        assert!(Strategy::from_code(5).is_err());
    }

    #[test]
    fn test_decode_framing() {
        assert_eq!(Options::new().decode_framing(), Framing::Auto);
        assert_eq!(
            Options::new().format(Format::Flate).decode_framing(),
            Framing::Raw
        );
        assert!(Framing::Auto.has_header());
        assert!(Framing::Gzip.has_header());
        assert!(!Framing::Zlib.has_header());
        assert!(!Framing::Raw.has_header());
    }
}

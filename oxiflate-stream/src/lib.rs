//! # OxiFlate Stream
//!
//! Buffered [`Read`](std::io::Read) and [`Write`](std::io::Write) adapters
//! over a stateful DEFLATE engine.
//!
//! - [`GzReader`]: pulls compressed bytes from any reader and yields
//!   decompressed bytes; decodes concatenated members transparently.
//! - [`GzWriter`]: accepts uncompressed bytes and pushes compressed bytes to
//!   any writer; call [`GzWriter::close`] or [`GzWriter::finish`] to write the
//!   trailer.
//!
//! Both adapters are generic over the engine
//! ([`InflateEngine`](oxiflate_core::InflateEngine) /
//! [`DeflateEngine`](oxiflate_core::DeflateEngine)) and default to the
//! `oxiflate-deflate` engine.
//!
//! ## Example
//!
//! ```rust
//! use oxiflate_core::{Header, Options};
//! use oxiflate_stream::{GzReader, GzWriter};
//! use std::io::{Read, Write};
//!
//! let mut writer = GzWriter::new(Vec::new()).unwrap();
//! writer.set_header(&Header::new().with_comment("hello")).unwrap();
//! writer.write_all(b"Hello, World!").unwrap();
//! let compressed = writer.finish().unwrap();
//!
//! let mut reader = GzReader::new(&compressed[..]).unwrap();
//! let mut text = String::new();
//! reader.read_to_string(&mut text).unwrap();
//! assert_eq!(text, "Hello, World!");
//! assert_eq!(reader.header().unwrap().comment.as_deref(), Some("hello"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod buffer;
pub mod reader;
mod slot;
pub mod writer;

pub use reader::GzReader;
pub use writer::GzWriter;

use oxiflate_core::{Options, Result};

/// Compress `data` into a single member.
pub fn compress_to_vec(data: &[u8], options: Options) -> Result<Vec<u8>> {
    let mut writer = GzWriter::with_options(Vec::with_capacity(data.len() / 2), options)?;
    writer.write_checked(data)?;
    writer.finish()
}

/// Decompress every member in `data`.
pub fn decompress_to_vec(data: &[u8], options: Options) -> Result<Vec<u8>> {
    let mut reader = GzReader::with_options(data, options)?;
    let mut output = Vec::with_capacity(data.len().saturating_mul(2));
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = reader.read_checked(&mut buf)?;
        if n == 0 {
            break;
        }
        output.extend_from_slice(&buf[..n]);
    }
    reader.close()?;
    Ok(output)
}

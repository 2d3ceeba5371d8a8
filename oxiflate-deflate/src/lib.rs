//! # OxiFlate Deflate
//!
//! Streaming DEFLATE engine (RFC 1951) with gzip (RFC 1952) and zlib
//! (RFC 1950) member framing.
//!
//! The engine is driven one step at a time through the
//! [`InflateEngine`](oxiflate_core::InflateEngine) and
//! [`DeflateEngine`](oxiflate_core::DeflateEngine) traits. Each step reports
//! how much input was consumed, how much output was produced, and a status
//! code; the engine never holds on to the caller's buffers.
//!
//! ## Features
//!
//! - **Decompression**: gzip, zlib, and raw members
//!   - Gzip/zlib detected per member from the first byte
//!   - Header capture (FEXTRA, FNAME, FCOMMENT, FHCRC)
//!   - CRC-32 and size trailer verification
//!   - Stops at the exact member boundary
//! - **Compression**: one member per engine
//!   - Levels 0-9
//!   - Framing selected by window bits
//!   - Gzip header set before the first step
//!
//! ## Example
//!
//! ```rust
//! use oxiflate_core::{Framing, Options};
//! use oxiflate_deflate::{deflate, inflate};
//!
//! let original = b"Hello, World! Hello, World!";
//! let compressed = deflate(original, &Options::default()).unwrap();
//!
//! let decompressed = inflate(&compressed, Framing::Auto).unwrap();
//! assert_eq!(&decompressed, original);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod deflate;
pub mod gzip;
pub mod inflate;

// Re-exports
pub use deflate::{Deflater, deflate};
pub use gzip::HeaderParser;
pub use inflate::{Inflater, inflate};

//! # OxiFlate Core
//!
//! Core components for the OxiFlate streaming library.
//!
//! This crate provides the pieces shared by the engine and the adapters:
//!
//! - [`engine`]: Traits a codec engine implements to be driven step by step
//! - [`status`]: Engine status codes and their translation into errors
//! - [`options`]: Adapter configuration
//! - [`header`]: Gzip member header metadata
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! OxiFlate is layered:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: CLI                                                 │
//! │     oxiflate compress / decompress / header             │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Stream adapters                                     │
//! │     GzReader (pull), GzWriter (push)                    │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Engine                                              │
//! │     Inflater / Deflater: gzip, zlib, raw framing        │
//! ├─────────────────────────────────────────────────────────┤
//! │ L0: Core (this crate)                                   │
//! │     Options, Header, engine traits, status translation  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxiflate_core::{OxiFlateError, Progress, StatusCode};
//!
//! assert_eq!(StatusCode::STREAM_END.translate().unwrap(), Progress::StreamEnd);
//! assert!(matches!(
//!     StatusCode::DATA_ERROR.translate(),
//!     Err(OxiFlateError::DataCorrupt { .. })
//! ));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod engine;
pub mod error;
pub mod header;
pub mod options;
pub mod status;

// Re-exports for convenience
pub use engine::{DeflateEngine, FlushMode, InflateEngine, Step};
pub use error::{OxiFlateError, Result};
pub use header::{Header, OS_UNKNOWN};
pub use options::{DEFAULT_BUFFER_SIZE, Format, Framing, Options, Strategy};
pub use status::{Progress, StatusCode};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::engine::{DeflateEngine, FlushMode, InflateEngine, Step};
    pub use crate::error::{OxiFlateError, Result};
    pub use crate::header::Header;
    pub use crate::options::{Format, Options};
}

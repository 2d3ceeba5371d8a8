//! Command implementations for OxiFlate CLI.

pub mod compress;
pub mod decompress;
pub mod header;

pub use compress::{CompressArgs, cmd_compress};
pub use decompress::{DecompressArgs, cmd_decompress};
pub use header::cmd_header;

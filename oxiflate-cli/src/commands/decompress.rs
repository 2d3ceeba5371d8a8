//! Decompress command implementation.

use crate::utils::{StreamFormat, format_size, open_input, open_output};
use oxiflate_core::{Format, Options};
use oxiflate_stream::GzReader;
use std::io::{self, Write};
use std::path::PathBuf;

/// Arguments for `oxiflate decompress`.
pub struct DecompressArgs {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: StreamFormat,
    pub buffer_size: Option<usize>,
}

pub fn cmd_decompress(args: &DecompressArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = Options::new()
        .format(Format::from(args.format))
        .capture_header(false);
    if let Some(size) = args.buffer_size {
        options = options.buffer_size(size);
    }

    let input = open_input(args.input.as_deref())?;
    let mut output = open_output(args.output.as_deref())?;
    let mut reader = GzReader::with_options(input, options)?;

    io::copy(&mut reader, &mut output)?;
    reader.close()?;
    output.flush()?;

    tracing::info!(
        members = reader.members(),
        input = reader.total_in(),
        output = reader.total_out(),
        "decompressed {} -> {}",
        format_size(reader.total_in()),
        format_size(reader.total_out())
    );
    Ok(())
}

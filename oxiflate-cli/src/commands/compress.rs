//! Compress command implementation.

use crate::utils::{StreamFormat, format_size, open_input, open_output};
use oxiflate_core::{Format, Header, Options};
use oxiflate_stream::GzWriter;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};

/// Arguments for `oxiflate compress`.
pub struct CompressArgs {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: StreamFormat,
    pub level: Option<i32>,
    pub buffer_size: Option<usize>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub mtime: Option<u32>,
}

/// Build the gzip header from explicit arguments, falling back to the
/// input file's name and modification time.
fn build_header(args: &CompressArgs) -> Header {
    let input = args
        .input
        .as_deref()
        .filter(|p| p.as_os_str() != "-");

    let mut header = Header::new();
    if let Some(name) = args.name.clone().or_else(|| {
        input
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
    }) {
        header = header.with_filename(name);
    }
    if let Some(comment) = &args.comment {
        header = header.with_comment(comment.clone());
    }
    let mtime = match args.mtime {
        Some(secs) => Some(UNIX_EPOCH + Duration::from_secs(u64::from(secs))),
        None => input
            .and_then(|p| std::fs::metadata(p).ok())
            .and_then(|m| m.modified().ok()),
    };
    if let Some(mtime) = mtime {
        // Whole seconds only.
        let secs = mtime
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        header = header.with_mtime(UNIX_EPOCH + Duration::from_secs(secs));
    }
    header
}

pub fn cmd_compress(args: &CompressArgs) -> Result<(), Box<dyn std::error::Error>> {
    let format = Format::from(args.format);
    let mut options = Options::new().format(format);
    if let Some(level) = args.level {
        options = options.level(level);
    }
    if let Some(size) = args.buffer_size {
        options = options.buffer_size(size);
    }

    let has_header_args = args.name.is_some() || args.comment.is_some() || args.mtime.is_some();
    if format == Format::Flate && has_header_args {
        return Err("--name, --comment and --mtime require the gzip format".into());
    }

    let mut input = open_input(args.input.as_deref())?;
    let output = open_output(args.output.as_deref())?;
    let mut writer = GzWriter::with_options(output, options)?;
    if format == Format::Gzip {
        writer.set_header(&build_header(args))?;
    }

    let copied = io::copy(&mut input, &mut writer)?;
    writer.close()?;
    let total_out = writer.total_out();
    writer.finish()?.flush()?;

    tracing::info!(
        input = copied,
        output = total_out,
        "compressed {} -> {}",
        format_size(copied),
        format_size(total_out)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> CompressArgs {
        CompressArgs {
            input: None,
            output: None,
            format: StreamFormat::Gzip,
            level: None,
            buffer_size: None,
            name: None,
            comment: None,
            mtime: None,
        }
    }

    #[test]
    fn test_header_from_arguments() {
        let header = build_header(&CompressArgs {
            name: Some("given.txt".to_string()),
            comment: Some("note".to_string()),
            mtime: Some(1_000),
            ..args()
        });
        assert_eq!(header.filename.as_deref(), Some("given.txt"));
        assert_eq!(header.comment.as_deref(), Some("note"));
        assert_eq!(header.mtime_unix().unwrap(), 1_000);
    }

    #[test]
    fn test_header_defaults_from_input_path() {
        let header = build_header(&CompressArgs {
            input: Some(PathBuf::from("/nonexistent/dir/data.bin")),
            ..args()
        });
        assert_eq!(header.filename.as_deref(), Some("data.bin"));
        assert!(header.mtime.is_none());
    }

    #[test]
    fn test_header_for_stdin_is_empty() {
        let header = build_header(&CompressArgs {
            input: Some(PathBuf::from("-")),
            ..args()
        });
        assert_eq!(header, Header::new());
    }
}

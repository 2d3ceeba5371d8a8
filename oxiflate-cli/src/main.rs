//! OxiFlate CLI - streaming gzip, zlib, and DEFLATE tool
//!
//! Compresses and decompresses byte streams through the OxiFlate adapters.

mod commands;
mod utils;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use commands::{CompressArgs, DecompressArgs, cmd_compress, cmd_decompress, cmd_header};
use std::path::PathBuf;
use utils::{StreamFormat, init_logging};

#[derive(Parser)]
#[command(name = "oxiflate")]
#[command(author, version, about = "Streaming gzip/DEFLATE compressor")]
#[command(long_about = "
OxiFlate compresses and decompresses gzip and raw DEFLATE streams.
Concatenated gzip members and zlib streams are decoded transparently.

Examples:
  oxiflate compress notes.txt -o notes.txt.gz
  oxiflate compress --level 9 --comment \"nightly\" < data.bin > data.bin.gz
  oxiflate decompress notes.txt.gz -o notes.txt
  oxiflate decompress --format flate payload.deflate
  oxiflate header notes.txt.gz --json
  oxiflate completions bash
")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file or stdin
    #[command(alias = "c")]
    Compress {
        /// Input file (stdin if omitted or "-")
        input: Option<PathBuf>,

        /// Output file (stdout if omitted or "-")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stream format
        #[arg(short, long, value_enum, default_value = "gzip")]
        format: StreamFormat,

        /// Compression level (0 = store, 1 = fastest, 9 = best, -1 = default)
        #[arg(short, long, allow_hyphen_values = true, value_parser = clap::value_parser!(i32).range(-1..=9))]
        level: Option<i32>,

        /// Internal buffer size in bytes
        #[arg(short, long)]
        buffer_size: Option<usize>,

        /// File name stored in the gzip header (defaults to the input name)
        #[arg(long)]
        name: Option<String>,

        /// Comment stored in the gzip header
        #[arg(long)]
        comment: Option<String>,

        /// Modification time stored in the gzip header (Unix seconds;
        /// defaults to the input file's)
        #[arg(long)]
        mtime: Option<u32>,
    },

    /// Decompress a file or stdin
    #[command(alias = "d")]
    Decompress {
        /// Input file (stdin if omitted or "-")
        input: Option<PathBuf>,

        /// Output file (stdout if omitted or "-")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stream format
        #[arg(short, long, value_enum, default_value = "gzip")]
        format: StreamFormat,

        /// Internal buffer size in bytes
        #[arg(short, long)]
        buffer_size: Option<usize>,
    },

    /// Show the gzip header of a file
    #[command(alias = "i")]
    Header {
        /// Gzip file to inspect
        input: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Compress {
            input,
            output,
            format,
            level,
            buffer_size,
            name,
            comment,
            mtime,
        } => cmd_compress(&CompressArgs {
            input,
            output,
            format,
            level,
            buffer_size,
            name,
            comment,
            mtime,
        }),
        Commands::Decompress {
            input,
            output,
            format,
            buffer_size,
        } => cmd_decompress(&DecompressArgs {
            input,
            output,
            format,
            buffer_size,
        }),
        Commands::Header { input, json } => cmd_header(&input, json),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "oxiflate",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_compress() {
        let cli = Cli::parse_from([
            "oxiflate", "-vv", "compress", "in.txt", "-o", "out.gz", "--level", "9", "--name",
            "renamed",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Compress {
                input,
                output,
                format,
                level,
                name,
                ..
            } => {
                assert_eq!(input, Some(PathBuf::from("in.txt")));
                assert_eq!(output, Some(PathBuf::from("out.gz")));
                assert_eq!(format, StreamFormat::Gzip);
                assert_eq!(level, Some(9));
                assert_eq!(name.as_deref(), Some("renamed"));
            }
            _ => panic!("expected compress"),
        }
    }

    #[test]
    fn test_level_range() {
        assert!(Cli::try_parse_from(["oxiflate", "compress", "--level", "10"]).is_err());
        assert!(Cli::try_parse_from(["oxiflate", "compress", "--level", "-1"]).is_ok());
    }
}

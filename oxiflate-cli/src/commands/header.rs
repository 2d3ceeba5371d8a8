//! Header command implementation.

use crate::utils::{format_size, os_name};
use oxiflate_core::Header;
use oxiflate_stream::GzReader;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// JSON serializable gzip header.
#[derive(Debug, Serialize)]
struct HeaderJson {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mtime: Option<u32>,
    os: u8,
    os_name: String,
    members: u64,
    compressed_size: u64,
    uncompressed_size: u64,
}

impl HeaderJson {
    fn new(file: &Path, header: &Header, members: u64, compressed: u64, uncompressed: u64) -> Self {
        Self {
            file: file.display().to_string(),
            filename: header.filename.clone(),
            comment: header.comment.clone(),
            extra: header.extra.clone(),
            mtime: header.mtime_unix().ok().filter(|&t| t != 0),
            os: header.os,
            os_name: os_name(header.os).to_string(),
            members,
            compressed_size: compressed,
            uncompressed_size: uncompressed,
        }
    }
}

pub fn cmd_header(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::open(input)?;
    let mut reader = GzReader::new(BufReader::new(file))?;

    // The first read stops at the end of the first non-empty member at the
    // latest, so the captured header belongs to that member.
    let mut buf = vec![0u8; 64 * 1024];
    let mut uncompressed = reader.read(&mut buf)? as u64;
    let header = reader.header()?;
    uncompressed += io::copy(&mut reader, &mut io::sink())?;
    reader.close()?;

    let info = HeaderJson::new(input, &header, reader.members(), reader.total_in(), uncompressed);

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("GZIP Header");
    println!("===========");
    println!("File: {}", info.file);
    if let Some(name) = &info.filename {
        println!("Original filename: {}", name);
    }
    if let Some(comment) = &info.comment {
        println!("Comment: {}", comment);
    }
    if let Some(extra) = &info.extra {
        println!("Extra field: {} bytes", extra.len());
    }
    if let Some(mtime) = info.mtime {
        println!("Modification time: {} (Unix timestamp)", mtime);
    }
    println!("OS: {} ({})", info.os_name, info.os);
    println!();
    println!("Members: {}", info.members);
    println!("Compressed size: {}", format_size(info.compressed_size));
    println!("Uncompressed size: {}", format_size(info.uncompressed_size));
    if info.uncompressed_size > 0 {
        println!(
            "Compression ratio: {:.1}%",
            (1.0 - info.compressed_size as f64 / info.uncompressed_size as f64) * 100.0
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_header_json() {
        let header = Header::new()
            .with_filename("blah")
            .with_comment("hello")
            .with_extra(vec![3, 2, 1])
            .with_mtime(UNIX_EPOCH + Duration::from_secs(99))
            .with_os(11);
        let info = HeaderJson::new(Path::new("a.gz"), &header, 1, 40, 4);
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["filename"], "blah");
        assert_eq!(value["comment"], "hello");
        assert_eq!(value["extra"], serde_json::json!([3, 2, 1]));
        assert_eq!(value["mtime"], 99);
        assert_eq!(value["os_name"], "NTFS");
    }

    #[test]
    fn test_unset_fields_are_omitted() {
        let info = HeaderJson::new(Path::new("a.gz"), &Header::new(), 1, 20, 0);
        let value = serde_json::to_value(&info).unwrap();
        assert!(value.get("filename").is_none());
        assert!(value.get("mtime").is_none());
        assert_eq!(value["os"], 255);
    }
}

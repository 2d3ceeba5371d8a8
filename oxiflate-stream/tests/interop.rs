//! Interoperability with an independent gzip implementation.

use flate2::Compression;
use flate2::read::{DeflateDecoder, GzDecoder, MultiGzDecoder};
use flate2::write::{DeflateEncoder, GzEncoder};
use oxiflate_core::{Format, Header, Options};
use oxiflate_stream::{GzReader, GzWriter, compress_to_vec, decompress_to_vec};
use std::io::{Read, Write};
use std::time::{Duration, UNIX_EPOCH};

#[test]
fn test_blah_default_options() {
    let mut writer = GzWriter::new(Vec::new()).unwrap();
    writer.write_all(b"Blah").unwrap();
    let compressed = writer.finish().unwrap();

    let mut ours = String::new();
    GzReader::new(&compressed[..])
        .unwrap()
        .read_to_string(&mut ours)
        .unwrap();
    assert_eq!(ours, "Blah");

    let mut theirs = String::new();
    GzDecoder::new(&compressed[..])
        .read_to_string(&mut theirs)
        .unwrap();
    assert_eq!(theirs, "Blah");
}

#[test]
fn test_flate2_reads_our_header() {
    let header = Header::new()
        .with_comment("hello")
        .with_filename("blah")
        .with_extra(vec![3, 2, 1])
        .with_mtime(UNIX_EPOCH + Duration::from_secs(1_000_000))
        .with_os(11);
    let mut writer = GzWriter::with_options(Vec::new(), Options::new().level(9)).unwrap();
    writer.set_header(&header).unwrap();
    writer.write_all(b"with header").unwrap();
    let compressed = writer.finish().unwrap();
    // XFL for maximum compression.
    assert_eq!(compressed[8], 2);

    let mut decoder = GzDecoder::new(&compressed[..]);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).unwrap();
    assert_eq!(out, b"with header");

    let parsed = decoder.header().unwrap();
    assert_eq!(parsed.comment(), Some(&b"hello"[..]));
    assert_eq!(parsed.filename(), Some(&b"blah"[..]));
    assert_eq!(parsed.extra(), Some(&[3u8, 2, 1][..]));
    assert_eq!(parsed.mtime(), 1_000_000);
    assert_eq!(parsed.operating_system(), 11);
}

#[test]
fn test_we_read_flate2_header() {
    let mut encoder = flate2::GzBuilder::new()
        .filename("notes.txt")
        .comment("from flate2")
        .extra(vec![9, 9])
        .mtime(42)
        .operating_system(3)
        .write(Vec::new(), Compression::fast());
    encoder.write_all(b"flate2 payload").unwrap();
    let compressed = encoder.finish().unwrap();

    let mut reader = GzReader::new(&compressed[..]).unwrap();
    let mut out = Vec::new();
    reader.read_to_end(&mut out).unwrap();
    assert_eq!(out, b"flate2 payload");

    let header = reader.header().unwrap();
    assert_eq!(header.filename.as_deref(), Some("notes.txt"));
    assert_eq!(header.comment.as_deref(), Some("from flate2"));
    assert_eq!(header.extra.as_deref(), Some(&[9u8, 9][..]));
    assert_eq!(header.mtime, Some(UNIX_EPOCH + Duration::from_secs(42)));
    assert_eq!(header.os, 3);
}

#[test]
fn test_multi_member_both_ways() {
    let parts: [&[u8]; 4] = [b"one ", b"", b"two ", b"three"];

    // Members produced by flate2, decoded by us.
    let mut theirs = Vec::new();
    for part in parts {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(part).unwrap();
        theirs.extend_from_slice(&enc.finish().unwrap());
    }
    assert_eq!(
        decompress_to_vec(&theirs, Options::default()).unwrap(),
        b"one two three"
    );

    // Members produced by us, decoded by flate2.
    let mut ours = Vec::new();
    for part in parts {
        ours.extend_from_slice(&compress_to_vec(part, Options::default()).unwrap());
    }
    let mut out = Vec::new();
    MultiGzDecoder::new(&ours[..]).read_to_end(&mut out).unwrap();
    assert_eq!(out, b"one two three");
}

#[test]
fn test_raw_deflate_both_ways() {
    let data = b"raw deflate interop ".repeat(100);
    let opts = Options::new().format(Format::Flate);

    let ours = compress_to_vec(&data, opts.clone()).unwrap();
    let mut out = Vec::new();
    DeflateDecoder::new(&ours[..]).read_to_end(&mut out).unwrap();
    assert_eq!(out, data);

    let mut enc = DeflateEncoder::new(Vec::new(), Compression::best());
    enc.write_all(&data).unwrap();
    let theirs = enc.finish().unwrap();
    assert_eq!(decompress_to_vec(&theirs, opts).unwrap(), data);
}

#[test]
fn test_large_payload_through_flate2() {
    let data: Vec<u8> = (0..2_000_000u32).map(|i| (i % 251) as u8 ^ (i >> 9) as u8).collect();
    let compressed = compress_to_vec(&data, Options::new().level(1)).unwrap();
    // XFL for fastest compression.
    assert_eq!(compressed[8], 4);

    let mut out = Vec::new();
    GzDecoder::new(&compressed[..]).read_to_end(&mut out).unwrap();
    assert_eq!(out, data);
}

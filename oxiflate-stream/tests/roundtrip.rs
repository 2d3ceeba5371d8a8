//! Round-trip tests through the reader and writer with the default engine.

use oxiflate_core::{Format, Header, OxiFlateError, Options};
use oxiflate_stream::{GzReader, GzWriter, compress_to_vec, decompress_to_vec};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::io::{self, Read, Write};
use std::time::{Duration, UNIX_EPOCH};

fn random_bytes(rng: &mut StdRng, len: usize) -> Vec<u8> {
    // Mix compressible runs with noise.
    let mut data = Vec::with_capacity(len);
    while data.len() < len {
        if rng.gen_bool(0.5) {
            let byte = rng.r#gen::<u8>();
            let run = rng.gen_range(1..64);
            data.extend(std::iter::repeat_n(byte, run));
        } else {
            let mut noise = vec![0u8; rng.gen_range(1..64)];
            rng.fill_bytes(&mut noise);
            data.extend_from_slice(&noise);
        }
    }
    data.truncate(len);
    data
}

/// Write `data` in random-sized chunks.
fn compress_chunked(data: &[u8], options: Options, rng: &mut StdRng) -> Vec<u8> {
    let mut writer = GzWriter::with_options(Vec::new(), options).unwrap();
    let mut pos = 0;
    while pos < data.len() {
        let n = rng.gen_range(0..=4096).min(data.len() - pos);
        writer.write_all(&data[pos..pos + n]).unwrap();
        pos += n;
    }
    writer.finish().unwrap()
}

/// Read everything with random-sized read buffers.
fn decompress_chunked<R: Read>(reader: &mut R, rng: &mut StdRng) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut buf = vec![0u8; 4096];
    loop {
        let len = rng.gen_range(1..=buf.len());
        let n = reader.read(&mut buf[..len])?;
        if n == 0 {
            return Ok(out);
        }
        out.extend_from_slice(&buf[..n]);
    }
}

fn oxiflate_error(err: &io::Error) -> Option<&OxiFlateError> {
    err.get_ref().and_then(|e| e.downcast_ref::<OxiFlateError>())
}

#[test]
fn test_random_chunks() {
    let mut rng = StdRng::seed_from_u64(42);
    for format in [Format::Gzip, Format::Flate] {
        for len in [0, 1, 100, 10_000, 300_000] {
            let data = random_bytes(&mut rng, len);
            let opts = Options::new().format(format).buffer_size(1 << 12);
            let compressed = compress_chunked(&data, opts.clone(), &mut rng);

            let mut reader = GzReader::with_options(&compressed[..], opts).unwrap();
            let decoded = decompress_chunked(&mut reader, &mut rng).unwrap();
            assert_eq!(decoded.len(), data.len());
            assert_eq!(decoded, data, "format {format:?}, len {len}");
            reader.close().unwrap();
        }
    }
}

#[test]
fn test_tiny_buffers() {
    let mut rng = StdRng::seed_from_u64(7);
    let data = random_bytes(&mut rng, 20_000);
    let opts = Options::new().buffer_size(1);
    let compressed = compress_chunked(&data, opts.clone(), &mut rng);
    let mut reader = GzReader::with_options(&compressed[..], opts).unwrap();
    assert_eq!(decompress_chunked(&mut reader, &mut rng).unwrap(), data);
}

#[test]
fn test_packed_members() {
    let mut rng = StdRng::seed_from_u64(1234);
    let mut packed = Vec::new();
    let mut expected = Vec::new();
    for i in 0..10 {
        let data = if i % 3 == 0 {
            Vec::new()
        } else {
            let len = rng.gen_range(0..50_000);
            random_bytes(&mut rng, len)
        };
        let level = rng.gen_range(0..=9);
        packed.extend_from_slice(&compress_to_vec(&data, Options::new().level(level)).unwrap());
        expected.extend_from_slice(&data);
    }

    let mut reader = GzReader::with_options(&packed[..], Options::new().buffer_size(777)).unwrap();
    let decoded = decompress_chunked(&mut reader, &mut rng).unwrap();
    assert_eq!(decoded, expected);
    assert_eq!(reader.members(), 10);
    assert_eq!(reader.total_in(), packed.len() as u64);
    assert_eq!(reader.total_out(), expected.len() as u64);
}

#[test]
fn test_header_roundtrip() {
    let mtime = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    let header = Header::new()
        .with_comment("hello")
        .with_filename("blah")
        .with_extra(vec![3, 2, 1])
        .with_mtime(mtime)
        .with_os(11);

    let mut writer = GzWriter::new(Vec::new()).unwrap();
    writer.set_header(&header).unwrap();
    writer.write_all(b"payload").unwrap();
    let compressed = writer.finish().unwrap();

    let mut reader = GzReader::new(&compressed[..]).unwrap();
    let mut out = Vec::new();
    reader.read_to_end(&mut out).unwrap();
    assert_eq!(out, b"payload");
    assert_eq!(reader.header().unwrap(), header);
}

#[test]
fn test_unset_header_fields_decode_as_none() {
    let mut writer = GzWriter::new(Vec::new()).unwrap();
    writer
        .set_header(&Header::new().with_comment("").with_extra(Vec::new()))
        .unwrap();
    writer.write_all(b"x").unwrap();
    let compressed = writer.finish().unwrap();

    let mut reader = GzReader::new(&compressed[..]).unwrap();
    io::copy(&mut reader, &mut io::sink()).unwrap();
    let header = reader.header().unwrap();
    assert_eq!(header, Header::new());
    assert!(header.comment.is_none());
    assert!(header.extra.is_none());
    assert!(header.mtime.is_none());
}

#[test]
fn test_header_before_epoch_is_unset() {
    let mut writer = GzWriter::new(Vec::new()).unwrap();
    writer
        .set_header(&Header::new().with_mtime(UNIX_EPOCH - Duration::from_secs(1)))
        .unwrap();
    let compressed = writer.finish().unwrap();
    assert_eq!(&compressed[4..8], &[0, 0, 0, 0]);
}

#[test]
fn test_header_after_2106_is_usage_error() {
    let mut writer = GzWriter::new(Vec::new()).unwrap();
    let far = UNIX_EPOCH + Duration::from_secs(u64::from(u32::MAX) + 1);
    let err = writer.set_header(&Header::new().with_mtime(far)).unwrap_err();
    assert!(err.is_usage_error());
}

#[test]
fn test_header_out_of_order() {
    let mut writer = GzWriter::new(Vec::new()).unwrap();
    writer.write_all(b"early").unwrap();
    assert!(writer.set_header(&Header::new()).unwrap_err().is_usage_error());

    let compressed = writer.finish().unwrap();
    let reader = GzReader::new(&compressed[..]).unwrap();
    assert!(reader.header().unwrap_err().is_usage_error());
}

#[test]
fn test_corrupt_payload_is_data_error() {
    let data = b"Some reasonably long payload, long enough to be worth compressing.".repeat(50);
    let compressed = compress_to_vec(&data, Options::default()).unwrap();

    for offset in [12, compressed.len() / 2, compressed.len() - 6] {
        let mut corrupt = compressed.clone();
        corrupt[offset] ^= 0x55;
        let mut reader = GzReader::new(&corrupt[..]).unwrap();
        let mut out = Vec::new();
        let err = reader.read_to_end(&mut out).unwrap_err();
        let inner = oxiflate_error(&err).unwrap();
        assert!(inner.is_data_error(), "offset {offset}: {inner}");

        // Sticky.
        let mut buf = [0u8; 16];
        assert!(reader.read(&mut buf).is_err());
        assert!(reader.close().is_err());
    }
}

#[test]
fn test_truncated_is_data_error() {
    let compressed = compress_to_vec(b"truncate me please", Options::default()).unwrap();
    for cut in [1, 5, 10, compressed.len() / 2, compressed.len() - 1] {
        let err = decompress_to_vec(&compressed[..cut], Options::default()).unwrap_err();
        assert!(err.is_data_error(), "cut {cut}: {err}");
    }
}

#[test]
fn test_empty_input_is_end_of_data() {
    let mut reader = GzReader::new(&b""[..]).unwrap();
    let mut buf = [0u8; 8];
    assert_eq!(reader.read(&mut buf).unwrap(), 0);
    reader.close().unwrap();
}

#[test]
fn test_zero_byte_write() {
    let mut writer = GzWriter::new(Vec::new()).unwrap();
    assert_eq!(writer.write(&[]).unwrap(), 0);
    assert!(writer.get_ref().is_empty());
    assert_eq!(writer.total_in(), 0);
}

#[test]
fn test_flush_makes_prefix_readable() {
    let mut writer = GzWriter::new(Vec::new()).unwrap();
    writer.write_all(b"first part").unwrap();
    writer.flush().unwrap();

    // A reader sees the flushed bytes before the stream is complete.
    let partial = writer.get_ref().clone();
    let mut reader = GzReader::new(&partial[..]).unwrap();
    let mut buf = [0u8; 64];
    let n = reader.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"first part");

    writer.write_all(b", second part").unwrap();
    let compressed = writer.finish().unwrap();
    assert_eq!(
        decompress_to_vec(&compressed, Options::default()).unwrap(),
        b"first part, second part"
    );
}

/// Sink that fails instead of growing past `limit` bytes.
struct CappedSink {
    data: Vec<u8>,
    limit: usize,
}

impl Write for CappedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.data.len() + buf.len() > self.limit {
            return Err(io::Error::other("sink limit exceeded"));
        }
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_flush_with_tiny_buffers() {
    // 1 byte, the size of an empty stored block, and around the flush window.
    for format in [Format::Gzip, Format::Flate] {
        for size in [1, 2, 4, 5, 6, 63, 64, 65] {
            let sink = CappedSink {
                data: Vec::new(),
                limit: 4096,
            };
            let opts = Options::new().format(format).buffer_size(size);
            let mut writer = GzWriter::with_options(sink, opts.clone()).unwrap();
            writer.write_all(b"hello").unwrap();
            writer.flush().unwrap();
            writer.flush().unwrap();
            writer.write_all(b", world").unwrap();
            writer.flush().unwrap();
            let sink = writer.finish().unwrap();

            assert_eq!(
                decompress_to_vec(&sink.data, opts).unwrap(),
                b"hello, world",
                "format {format:?}, buffer {size}"
            );
        }
    }
}

#[test]
fn test_flush_large_pending_with_one_byte_buffer() {
    let mut rng = StdRng::seed_from_u64(99);
    let data = random_bytes(&mut rng, 30_000);
    let sink = CappedSink {
        data: Vec::new(),
        limit: 1 << 20,
    };
    let mut writer = GzWriter::with_options(sink, Options::new().buffer_size(1)).unwrap();
    writer.write_all(&data).unwrap();
    writer.flush().unwrap();

    // Everything written so far is decodable before the trailer.
    let partial = writer.get_ref().data.clone();
    let mut reader = GzReader::new(&partial[..]).unwrap();
    let mut prefix = vec![0u8; data.len()];
    let mut filled = 0;
    while filled < data.len() {
        let n = reader.read(&mut prefix[filled..]).unwrap();
        assert!(n > 0);
        filled += n;
    }
    assert_eq!(prefix, data);

    let sink = writer.finish().unwrap();
    assert_eq!(decompress_to_vec(&sink.data, Options::default()).unwrap(), data);
}

#[test]
fn test_zlib_via_window_bits() {
    let data = b"zlib framed through window bits".repeat(10);
    let compressed = compress_to_vec(&data, Options::new().window_bits(15)).unwrap();
    assert_eq!(compressed[0] & 0x0F, 8);

    // Gzip-format readers accept zlib members.
    assert_eq!(decompress_to_vec(&compressed, Options::default()).unwrap(), data);

    let compressed = compress_to_vec(&data, Options::new().window_bits(9)).unwrap();
    assert_eq!(compressed[0], 0x18);
    assert_eq!(decompress_to_vec(&compressed, Options::default()).unwrap(), data);
}

#[test]
fn test_io_copy_composes() {
    let data = b"piped through std::io::copy".repeat(1000);
    let mut writer = GzWriter::with_options(Vec::new(), Options::new().level(1)).unwrap();
    io::copy(&mut &data[..], &mut writer).unwrap();
    let compressed = writer.finish().unwrap();

    let mut reader = GzReader::new(&compressed[..]).unwrap();
    let mut out = Vec::new();
    io::copy(&mut reader, &mut out).unwrap();
    assert_eq!(out, data);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..8192), flate in any::<bool>()) {
        let format = if flate { Format::Flate } else { Format::Gzip };
        let opts = Options::new().format(format);
        let compressed = compress_to_vec(&data, opts.clone()).unwrap();
        prop_assert_eq!(decompress_to_vec(&compressed, opts).unwrap(), data);
    }

    #[test]
    fn prop_chunking_invariance(
        data in proptest::collection::vec(any::<u8>(), 0..8192),
        buffer in 1usize..512,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let opts = Options::new().buffer_size(buffer);
        let compressed = compress_chunked(&data, opts.clone(), &mut rng);
        let mut reader = GzReader::with_options(&compressed[..], opts).unwrap();
        prop_assert_eq!(decompress_chunked(&mut reader, &mut rng).unwrap(), data);
    }
}

use std::fs::File;
use std::io::{Read, Write};

use oxiflate::{
    BlockStream, CompressData, CompressFile, DecompressData, FileWindow, Framing, StreamOptions,
};
use proptest::prelude::*;
use tempfile::NamedTempFile;

fn opts(block_size: usize, level: u32) -> StreamOptions {
    StreamOptions { block_size, level }
}

fn collect(stream: &mut impl BlockStream) -> Vec<u8> {
    let mut out = Vec::new();
    for chunk in stream.chunks() {
        out.extend(chunk.unwrap());
    }
    out
}

fn framing() -> impl Strategy<Value = Framing> {
    prop_oneof![Just(Framing::Zlib), Just(Framing::Gzip)]
}

proptest! {
    #[test]
    fn prop_compress_decompress_roundtrip(
        data in proptest::collection::vec(any::<u8>(), 0..8192),
        block_size in 64usize..2048,
        level in 0u32..=9u32,
        framing in framing()
    ) {
        let options = opts(block_size, level);
        let packed = collect(&mut CompressData::with_options(&data, framing, options));
        let unpacked = collect(&mut DecompressData::with_options(&packed, framing, options));
        prop_assert_eq!(unpacked, data);
    }

    #[test]
    fn prop_chunks_are_bounded_and_non_empty(
        data in proptest::collection::vec(any::<u8>(), 0..6000),
        block_size in 64usize..512,
        framing in framing()
    ) {
        let mut s = CompressData::with_options(&data, framing, opts(block_size, 6));
        for chunk in s.chunks() {
            let chunk = chunk.unwrap();
            prop_assert!(!chunk.is_empty());
            prop_assert!(chunk.len() <= block_size);
        }
        prop_assert!(!s.has_more());
    }

    #[test]
    fn prop_compression_is_deterministic(
        data in proptest::collection::vec(any::<u8>(), 0..4096),
        framing in framing()
    ) {
        let a = collect(&mut CompressData::new(&data, framing));
        let b = collect(&mut CompressData::new(&data, framing));
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_file_window_matches_memory_slice(
        data in proptest::collection::vec(any::<u8>(), 1..6000),
        start_frac in 0.0f64..1.0,
        len_frac in 0.0f64..1.0,
        block_size in 64usize..1024,
        framing in framing()
    ) {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(&data).unwrap();
        tmp.flush().unwrap();
        let file = File::open(tmp.path()).unwrap();

        let offset = (data.len() as f64 * start_frac) as usize;
        let len = ((data.len() - offset) as f64 * len_frac) as usize;
        let options = opts(block_size, 6);

        let mut from_file = CompressFile::attach_with_options(
            &file,
            FileWindow::range(offset as u64, len as u64),
            framing,
            options,
        );
        let mut from_mem =
            CompressData::with_options(&data[offset..offset + len], framing, options);
        prop_assert_eq!(collect(&mut from_file), collect(&mut from_mem));
    }

    #[test]
    fn prop_reset_isolation(
        first in proptest::collection::vec(any::<u8>(), 0..3000),
        second in proptest::collection::vec(any::<u8>(), 0..3000),
        stop_after in 0usize..4,
        framing in framing()
    ) {
        let options = opts(256, 6);
        let mut reused = CompressData::with_options(&first, Framing::Gzip, options);
        // Abandon the first stream part-way through.
        for chunk in reused.chunks().take(stop_after) {
            chunk.unwrap();
        }
        reused.reset(&second, framing);

        let mut fresh = CompressData::with_options(&second, framing, options);
        prop_assert_eq!(collect(&mut reused), collect(&mut fresh));
    }

    #[test]
    fn prop_reader_matches_chunks(
        data in proptest::collection::vec(any::<u8>(), 0..5000),
        read_size in 1usize..700
    ) {
        let packed = collect(&mut CompressData::new(&data, Framing::Zlib));

        let mut s = DecompressData::with_options(&packed, Framing::Zlib, opts(128, 6));
        let mut reader = s.reader();
        let mut out = Vec::new();
        let mut buf = vec![0u8; read_size];
        loop {
            let n = reader.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        prop_assert_eq!(out, data);
    }

    #[test]
    fn prop_truncation_never_panics(
        data in proptest::collection::vec(any::<u8>(), 0..2000),
        cut_frac in 0.0f64..1.0,
        framing in framing()
    ) {
        let packed = collect(&mut CompressData::new(&data, framing));
        let cut = (packed.len() as f64 * cut_frac) as usize;
        let mut s = DecompressData::new(&packed[..cut], framing);
        let result: Result<Vec<_>, _> = s.chunks().collect();
        prop_assert!(result.is_err());
        prop_assert!(result.unwrap_err().is_codec());
        prop_assert!(s.is_failed());
    }
}

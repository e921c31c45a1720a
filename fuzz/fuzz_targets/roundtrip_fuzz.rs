#![no_main]
use libfuzzer_sys::fuzz_target;
use oxiflate::{BlockStream, CompressData, DecompressData, Framing, StreamOptions};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks framing, level and block size.
    let flags = data[0];
    let payload = &data[1..];
    let framing = Framing::from_gzip(flags & 1 != 0);
    let options = StreamOptions {
        block_size: 64 << ((flags >> 1) & 7),
        level: u32::from(flags >> 4) % 10,
    };

    let mut packed = Vec::new();
    for chunk in CompressData::with_options(payload, framing, options).chunks() {
        packed.extend(chunk.unwrap());
    }

    let mut unpacked = Vec::new();
    for chunk in DecompressData::with_options(&packed, framing, options).chunks() {
        unpacked.extend(chunk.unwrap());
    }
    assert_eq!(unpacked, payload);
});

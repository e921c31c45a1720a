#![no_main]
use libfuzzer_sys::fuzz_target;
use oxiflate::{BlockStream, DecompressData, Framing, StreamOptions};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must only ever produce errors, never panics or hangs.
    for framing in [Framing::Zlib, Framing::Gzip] {
        let mut s = DecompressData::with_options(
            data,
            framing,
            StreamOptions {
                block_size: 64,
                ..Default::default()
            },
        );
        for chunk in s.chunks() {
            match chunk {
                Ok(c) => assert!(!c.is_empty() && c.len() <= 64),
                Err(e) => {
                    assert!(e.is_codec());
                    break;
                }
            }
        }
        assert!(!s.has_more());
    }
});

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use oxiflate::{BlockStream, CodecError, CompressData, DecompressData, Framing, StreamError};

fn compress(data: &[u8], framing: Framing) -> Vec<u8> {
    let mut out = Vec::new();
    for chunk in CompressData::new(data, framing).chunks() {
        out.extend(chunk.unwrap());
    }
    out
}

fn decompress(data: &[u8], framing: Framing) -> Result<Vec<u8>, StreamError> {
    let mut out = Vec::new();
    for chunk in DecompressData::new(data, framing).chunks() {
        out.extend(chunk?);
    }
    Ok(out)
}

fn text() -> Vec<u8> {
    b"Pack my box with five dozen liquor jugs. ".repeat(2000)
}

#[test]
fn gzip_output_has_magic_and_deflate_method() {
    let packed = compress(b"the quick brown fox", Framing::Gzip);
    assert_eq!(&packed[..3], &[0x1f, 0x8b, 0x08]);
}

#[test]
fn zlib_output_has_deflate_header() {
    let packed = compress(b"the quick brown fox", Framing::Zlib);
    assert_eq!(packed[0] & 0x0f, 8);
    assert_eq!(u16::from_be_bytes([packed[0], packed[1]]) % 31, 0);
}

#[test]
fn gzip_output_decodes_with_reference_decoder() {
    let data = text();
    let packed = compress(&data, Framing::Gzip);
    let mut out = Vec::new();
    GzDecoder::new(&packed[..]).read_to_end(&mut out).unwrap();
    assert_eq!(out, data);
}

#[test]
fn zlib_output_decodes_with_reference_decoder() {
    let data = text();
    let packed = compress(&data, Framing::Zlib);
    let mut out = Vec::new();
    ZlibDecoder::new(&packed[..]).read_to_end(&mut out).unwrap();
    assert_eq!(out, data);
}

#[test]
fn decodes_reference_encoder_output() {
    let data = text();

    let mut gz = GzEncoder::new(Vec::new(), Compression::best());
    gz.write_all(&data).unwrap();
    assert_eq!(decompress(&gz.finish().unwrap(), Framing::Gzip).unwrap(), data);

    let mut z = ZlibEncoder::new(Vec::new(), Compression::fast());
    z.write_all(&data).unwrap();
    assert_eq!(decompress(&z.finish().unwrap(), Framing::Zlib).unwrap(), data);
}

#[test]
fn quick_brown_fox_is_deterministic() {
    for framing in [Framing::Zlib, Framing::Gzip] {
        let a = compress(b"the quick brown fox", framing);
        let b = compress(b"the quick brown fox", framing);
        assert_eq!(a, b);
        assert_eq!(decompress(&a, framing).unwrap(), b"the quick brown fox");
    }
}

#[test]
fn wrong_framing_is_codec_error() {
    let packed = compress(b"framed as zlib", Framing::Zlib);
    let err = decompress(&packed, Framing::Gzip).unwrap_err();
    assert!(err.is_codec());

    let packed = compress(b"framed as gzip", Framing::Gzip);
    assert!(decompress(&packed, Framing::Zlib).unwrap_err().is_codec());
}

#[test]
fn corrupt_trailer_is_codec_error() {
    for framing in [Framing::Zlib, Framing::Gzip] {
        let mut packed = compress(&text(), framing);
        // The last bytes are the checksum (zlib) or input size (gzip).
        let last = packed.len() - 1;
        packed[last] ^= 0xff;
        let err = decompress(&packed, framing).unwrap_err();
        assert!(
            matches!(err, StreamError::Codec(CodecError::Decompress(_))),
            "{framing:?}: {err}"
        );
    }
}

#[test]
fn corrupt_body_is_codec_error() {
    let mut packed = compress(&text(), Framing::Zlib);
    // Zero a run inside the deflate body; either the block structure or the
    // Adler-32 check catches it.
    let mid = packed.len() / 2;
    for b in &mut packed[mid..mid + 8] {
        *b = !*b;
    }
    assert!(decompress(&packed, Framing::Zlib).unwrap_err().is_codec());
}

#[test]
fn truncated_streams_are_codec_errors() {
    for framing in [Framing::Zlib, Framing::Gzip] {
        let packed = compress(&text(), framing);
        for cut in [0, 1, 2, 10, packed.len() / 2, packed.len() - 1] {
            let err = decompress(&packed[..cut], framing).unwrap_err();
            assert!(err.is_codec(), "{framing:?} cut at {cut}: {err}");
        }
    }
}

#[test]
fn data_after_stream_end_is_ignored() {
    let mut packed = compress(b"payload", Framing::Gzip);
    packed.extend_from_slice(b"trailing junk that is not a gzip member");
    assert_eq!(decompress(&packed, Framing::Gzip).unwrap(), b"payload");
}

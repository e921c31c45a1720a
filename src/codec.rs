// Codec context: a thin, framing-aware wrapper around flate2's low-level
// `Compress` / `Decompress` engines.
//
// Each call reports how many input bytes were consumed and how many output
// bytes were produced, measured from the engine's running totals.

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};

use crate::error::CodecError;

/// History window size used for both framings.
pub const WINDOW_BITS: u8 = 15;

/// Container framing around the DEFLATE body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// 2-byte header, Adler-32 trailer.
    #[default]
    Zlib,
    /// 10-byte header, CRC-32 + size trailer.
    Gzip,
}

impl Framing {
    /// Map the conventional `gzip` flag to a framing.
    pub fn from_gzip(gzip: bool) -> Self {
        if gzip { Self::Gzip } else { Self::Zlib }
    }

    pub fn is_gzip(self) -> bool {
        self == Self::Gzip
    }
}

/// Flush directive for a compression call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flush {
    /// Buffer freely; output may lag behind input.
    None,
    /// Emit everything so far without byte-aligning the block.
    Partial,
    /// Emit everything so far and align to a byte boundary.
    Sync,
    /// Like `Sync`, and reset the dictionary.
    Full,
    /// Emit the final block and trailer.
    Finish,
}

impl From<Flush> for FlushCompress {
    fn from(flush: Flush) -> Self {
        match flush {
            Flush::None => FlushCompress::None,
            Flush::Partial => FlushCompress::Partial,
            Flush::Sync => FlushCompress::Sync,
            Flush::Full => FlushCompress::Full,
            Flush::Finish => FlushCompress::Finish,
        }
    }
}

/// Outcome of a single engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub consumed: usize,
    pub produced: usize,
    /// The engine reported end of stream.
    pub finished: bool,
}

impl Progress {
    pub fn is_stalled(&self) -> bool {
        self.consumed == 0 && self.produced == 0 && !self.finished
    }
}

fn delta(after: u64, before: u64) -> usize {
    usize::try_from(after - before).unwrap_or(usize::MAX)
}

// ---------------------------------------------------------------------------
// Compressor
// ---------------------------------------------------------------------------

/// Stateful DEFLATE compressor bound to one framing and level.
///
/// Not `Clone`: the engine's dictionary state is unique to this instance.
pub struct Compressor {
    inner: Compress,
    framing: Framing,
    level: u32,
}

impl Compressor {
    pub fn new(framing: Framing, level: u32) -> Self {
        let compression = Compression::new(level.min(9));
        let inner = match framing {
            Framing::Zlib => Compress::new(compression, true),
            Framing::Gzip => Compress::new_gzip(compression, WINDOW_BITS),
        };
        Self {
            inner,
            framing,
            level,
        }
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Whether this engine can be reset in place for the given settings.
    pub fn matches(&self, framing: Framing, level: u32) -> bool {
        self.framing == framing && self.level == level
    }

    /// Return the engine to a freshly-constructed state.
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Feed `input`, writing at most `output.len()` bytes.
    pub fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: Flush,
    ) -> Result<Progress, CodecError> {
        let before_in = self.inner.total_in();
        let before_out = self.inner.total_out();
        let status = self.inner.compress(input, output, flush.into())?;
        Ok(Progress {
            consumed: delta(self.inner.total_in(), before_in),
            produced: delta(self.inner.total_out(), before_out),
            finished: status == Status::StreamEnd,
        })
    }

    pub fn total_in(&self) -> u64 {
        self.inner.total_in()
    }

    pub fn total_out(&self) -> u64 {
        self.inner.total_out()
    }
}

// ---------------------------------------------------------------------------
// Decompressor
// ---------------------------------------------------------------------------

/// Stateful DEFLATE decompressor bound to one framing.
pub struct Decompressor {
    inner: Decompress,
    framing: Framing,
}

impl Decompressor {
    pub fn new(framing: Framing) -> Self {
        Self {
            inner: Self::engine(framing),
            framing,
        }
    }

    fn engine(framing: Framing) -> Decompress {
        match framing {
            Framing::Zlib => Decompress::new(true),
            Framing::Gzip => Decompress::new_gzip(WINDOW_BITS),
        }
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Return the engine to a freshly-constructed state.
    pub fn reset(&mut self) {
        match self.framing {
            Framing::Zlib => self.inner.reset(true),
            // `Decompress::reset` only knows about zlib/raw headers.
            Framing::Gzip => self.inner = Self::engine(Framing::Gzip),
        }
    }

    /// Feed `input`, writing at most `output.len()` bytes.
    ///
    /// `finish` tells the engine no further input will follow.
    pub fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        finish: bool,
    ) -> Result<Progress, CodecError> {
        let flush = if finish {
            FlushDecompress::Finish
        } else {
            FlushDecompress::None
        };
        let before_in = self.inner.total_in();
        let before_out = self.inner.total_out();
        let status = self.inner.decompress(input, output, flush)?;
        Ok(Progress {
            consumed: delta(self.inner.total_in(), before_in),
            produced: delta(self.inner.total_out(), before_out),
            finished: status == Status::StreamEnd,
        })
    }

    pub fn total_in(&self) -> u64 {
        self.inner.total_in()
    }

    pub fn total_out(&self) -> u64 {
        self.inner.total_out()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

    fn compress_all(framing: Framing, data: &[u8]) -> Vec<u8> {
        let mut c = Compressor::new(framing, 6);
        let mut out = vec![0u8; 1024];
        let p = c.compress(data, &mut out, Flush::Finish).unwrap();
        assert!(p.finished);
        assert_eq!(p.consumed, data.len());
        out.truncate(p.produced);
        out
    }

    #[test]
    fn gzip_header_magic() {
        let out = compress_all(Framing::Gzip, b"hello");
        assert_eq!(out[..2], GZIP_MAGIC);
        assert_eq!(out[2], 8, "compression method must be DEFLATE");
    }

    #[test]
    fn zlib_header_check_bits() {
        let out = compress_all(Framing::Zlib, b"hello");
        assert_eq!(out[0] & 0x0F, 8);
        let header = u16::from_be_bytes([out[0], out[1]]);
        assert_eq!(header % 31, 0);
    }

    #[test]
    fn decompressor_roundtrip_both_framings() {
        for framing in [Framing::Zlib, Framing::Gzip] {
            let packed = compress_all(framing, b"the quick brown fox");
            let mut d = Decompressor::new(framing);
            let mut out = vec![0u8; 64];
            let p = d.decompress(&packed, &mut out, true).unwrap();
            assert!(p.finished);
            assert_eq!(&out[..p.produced], b"the quick brown fox");
        }
    }

    #[test]
    fn reset_restores_fresh_output() {
        let mut c = Compressor::new(Framing::Gzip, 6);
        let mut first = vec![0u8; 256];
        let p1 = c.compress(b"abcabcabc", &mut first, Flush::Finish).unwrap();
        c.reset();
        let mut second = vec![0u8; 256];
        let p2 = c.compress(b"abcabcabc", &mut second, Flush::Finish).unwrap();
        assert_eq!(first[..p1.produced], second[..p2.produced]);
    }

    #[test]
    fn wrong_framing_is_rejected() {
        let packed = compress_all(Framing::Zlib, b"payload");
        let mut d = Decompressor::new(Framing::Gzip);
        let mut out = vec![0u8; 64];
        assert!(d.decompress(&packed, &mut out, true).is_err());
    }

    #[test]
    fn framing_from_flag() {
        assert_eq!(Framing::from_gzip(true), Framing::Gzip);
        assert_eq!(Framing::from_gzip(false), Framing::Zlib);
        assert!(!Framing::default().is_gzip());
    }
}

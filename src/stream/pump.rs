// Codec drivers: each pump couples one source with one codec direction and
// performs exactly one codec call per `pump()`.
//
// Input is staged block by block into the arena's input buffer. A block is
// only replaced once it is fully consumed and the previous call did not fill
// the output buffer, so pending codec output is always drained first.

use log::debug;

use crate::codec::{Compressor, Decompressor, Flush, Framing, Progress};
use crate::error::{CodecError, Result};

use super::StreamOptions;
use super::arena::BufferArena;
use super::source::Source;

/// A source bound to a codec direction, driven by `BlockStreamer`.
pub trait Pump {
    type Source: Source;

    /// Label used in log lines.
    const DIRECTION: &'static str;

    fn new(source: Self::Source, framing: Framing, options: &StreamOptions) -> Self
    where
        Self: Sized;

    fn framing(&self) -> Framing;

    fn source(&self) -> &Self::Source;

    /// Replace the source and framing; takes effect on the next `prime`.
    fn rebind(&mut self, source: Self::Source, framing: Framing);

    /// Set up a fresh codec and rewind the source.
    fn prime(&mut self, options: &StreamOptions) -> Result<()>;

    /// One codec call writing into `arena.output`.
    ///
    /// Never returns a stalled `Progress`: either bytes move, the stream
    /// finishes, or an error is raised.
    fn pump(&mut self, arena: &mut BufferArena) -> Result<Progress>;

    fn total_in(&self) -> u64;

    fn total_out(&self) -> u64;
}

/// Read position within the staged input block.
#[derive(Debug, Clone, Copy, Default)]
struct Block {
    len: usize,
    pos: usize,
    /// The block holds the final source bytes.
    last: bool,
    /// The previous codec call filled the whole output buffer.
    drain: bool,
}

impl Block {
    fn is_consumed(&self) -> bool {
        self.pos == self.len
    }

    fn stage<S: Source>(&mut self, source: &mut S, input: &mut [u8]) -> Result<()> {
        let n = source.fill(input)?;
        *self = Block {
            len: n,
            pos: 0,
            last: n < input.len() || source.is_exhausted(),
            drain: false,
        };
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Deflater
// ---------------------------------------------------------------------------

/// Compression pump.
///
/// Every block but the last is fed with a partial flush, so each chunk
/// boundary is decodable up to that point. The block carrying the last
/// source byte is fed with `Finish`.
pub struct Deflater<S> {
    source: S,
    codec: Compressor,
    framing: Framing,
    block: Block,
}

impl<S: Source> Deflater<S> {
    /// Compress `input` directly, bypassing the bound source.
    ///
    /// Returns all output produced (which may exceed `scratch.len()`) and
    /// whether the codec finished the stream.
    pub(crate) fn push(
        &mut self,
        input: &[u8],
        flush: Flush,
        scratch: &mut [u8],
    ) -> Result<(Vec<u8>, bool)> {
        let mut out = Vec::new();
        let mut pos = 0;
        loop {
            let p = self.codec.compress(&input[pos..], scratch, flush)?;
            pos += p.consumed;
            out.extend_from_slice(&scratch[..p.produced]);

            if p.finished {
                return Ok((out, true));
            }
            let output_full = p.produced == scratch.len();
            if pos == input.len() && !output_full {
                return Ok((out, false));
            }
            if p.is_stalled() {
                return Ok((out, false));
            }
        }
    }
}

impl<S: Source> Pump for Deflater<S> {
    type Source = S;

    const DIRECTION: &'static str = "compress";

    fn new(source: S, framing: Framing, options: &StreamOptions) -> Self {
        Self {
            source,
            codec: Compressor::new(framing, options.level),
            framing,
            block: Block::default(),
        }
    }

    fn framing(&self) -> Framing {
        self.framing
    }

    fn source(&self) -> &S {
        &self.source
    }

    fn rebind(&mut self, source: S, framing: Framing) {
        self.source = source;
        self.framing = framing;
    }

    fn prime(&mut self, options: &StreamOptions) -> Result<()> {
        if self.codec.matches(self.framing, options.level) {
            self.codec.reset();
        } else {
            self.codec = Compressor::new(self.framing, options.level);
        }
        self.source.prepare()?;
        self.block = Block::default();
        Ok(())
    }

    fn pump(&mut self, arena: &mut BufferArena) -> Result<Progress> {
        if self.block.is_consumed() && !self.block.drain && !self.block.last {
            self.block.stage(&mut self.source, &mut arena.input)?;
        }

        let flush = if self.block.last {
            Flush::Finish
        } else {
            Flush::Partial
        };
        let input = &arena.input[self.block.pos..self.block.len];
        let p = self.codec.compress(input, &mut arena.output, flush)?;
        self.block.pos += p.consumed;
        self.block.drain = p.produced == arena.output.len();

        if p.is_stalled() && self.block.is_consumed() && !self.block.last {
            // Nothing was pending after all; move on to the next block.
            return self.pump(arena);
        }
        Ok(p)
    }

    fn total_in(&self) -> u64 {
        self.codec.total_in()
    }

    fn total_out(&self) -> u64 {
        self.codec.total_out()
    }
}

// ---------------------------------------------------------------------------
// Inflater
// ---------------------------------------------------------------------------

/// Decompression pump.
///
/// Bytes following the end of the compressed stream are ignored. Running out
/// of source bytes before the codec reports end of stream is an error.
pub struct Inflater<S> {
    source: S,
    codec: Decompressor,
    framing: Framing,
    block: Block,
}

impl<S: Source> Pump for Inflater<S> {
    type Source = S;

    const DIRECTION: &'static str = "decompress";

    fn new(source: S, framing: Framing, _options: &StreamOptions) -> Self {
        Self {
            source,
            codec: Decompressor::new(framing),
            framing,
            block: Block::default(),
        }
    }

    fn framing(&self) -> Framing {
        self.framing
    }

    fn source(&self) -> &S {
        &self.source
    }

    fn rebind(&mut self, source: S, framing: Framing) {
        self.source = source;
        self.framing = framing;
    }

    fn prime(&mut self, _options: &StreamOptions) -> Result<()> {
        if self.codec.framing() == self.framing {
            self.codec.reset();
        } else {
            self.codec = Decompressor::new(self.framing);
        }
        self.source.prepare()?;
        self.block = Block::default();
        Ok(())
    }

    fn pump(&mut self, arena: &mut BufferArena) -> Result<Progress> {
        if self.block.is_consumed() && !self.block.last {
            self.block.stage(&mut self.source, &mut arena.input)?;
        }

        let input = &arena.input[self.block.pos..self.block.len];
        let p = self.codec.decompress(input, &mut arena.output, false)?;
        self.block.pos += p.consumed;

        if p.finished {
            let trailing = (self.block.len - self.block.pos) as u64;
            if trailing > 0 || !self.block.last {
                debug!(
                    "decompress: ignoring data after end of stream ({trailing} staged bytes{})",
                    if self.block.last { "" } else { " and more in source" }
                );
            }
            return Ok(p);
        }

        if p.is_stalled() {
            if self.block.is_consumed() && !self.block.last {
                self.block.stage(&mut self.source, &mut arena.input)?;
                return self.pump(arena);
            }
            return Err(CodecError::Truncated {
                consumed: self.codec.total_in(),
            }
            .into());
        }
        Ok(p)
    }

    fn total_in(&self) -> u64 {
        self.codec.total_in()
    }

    fn total_out(&self) -> u64 {
        self.codec.total_out()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Pull-based block streaming.
//
// A `BlockStreamer<P>` owns a fixed `BufferArena`, a state flag and a pump
// `P` that couples one source (memory or file range) with one codec
// direction (compress or decompress). Callers pull bounded chunks:
//
//   - `init()`        Unstarted -> Active, returns the first chunk
//   - `next_chunk()`  one chunk per call, Terminal once the codec finishes
//   - `chunks()`      lazy, forward-only iterator over the same protocol
//   - `reader()`      `std::io::Read` adapter over the chunk sequence
//
// - `arena`  : the two fixed scratch buffers
// - `source` : memory and file-range byte sources
// - `pump`   : Deflater / Inflater codec drivers
// - `memory` : CompressData / DecompressData
// - `file`   : CompressFile / DecompressFile

pub mod arena;
pub mod file;
pub mod memory;
pub mod pump;
pub mod source;

use std::io;

use log::{debug, trace};

use crate::codec::Framing;
use crate::error::{Result, StreamError};

pub use arena::BufferArena;
pub use file::{CompressFile, DecompressFile};
pub use memory::{CompressData, DecompressData};
pub use pump::{Deflater, Inflater, Pump};
pub use source::{FileSource, FileWindow, MemorySource, Source};

/// Default capacity of each arena buffer.
pub const DEFLATE_BLOCK_SIZE: usize = 16 * 1024; // 16 KiB

/// Smallest accepted arena capacity.
pub const MIN_BLOCK_SIZE: usize = 64;

/// One unit of pulled output, at most one arena capacity long.
pub type Chunk = Vec<u8>;

// ---------------------------------------------------------------------------
// State + options
// ---------------------------------------------------------------------------

/// Lifecycle of one logical stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    /// Bound to a source, codec not yet initialized.
    #[default]
    Unstarted,
    /// Producing chunks.
    Active,
    /// No further chunks; absorbing until the next reset.
    Terminal,
}

/// Configuration for a stream instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    /// Capacity of each arena buffer; also the input block size.
    pub block_size: usize,
    /// Compression level (0-9). Ignored when decompressing.
    pub level: u32,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            block_size: DEFLATE_BLOCK_SIZE,
            level: 6,
        }
    }
}

// ---------------------------------------------------------------------------
// BlockStream trait
// ---------------------------------------------------------------------------

/// The pull protocol shared by all four stream variants.
///
/// Object safe, so heterogeneous streams can be driven through
/// `&mut dyn BlockStream`.
pub trait BlockStream {
    fn state(&self) -> StreamState;

    /// Initialize the codec and return the first chunk.
    ///
    /// Only valid while `Unstarted`.
    fn init(&mut self) -> Result<Chunk>;

    /// Return the next chunk.
    ///
    /// Once `Terminal`, returns an empty chunk without doing any work, or
    /// `StreamError::Failed` if the stream ended in an error.
    fn next_chunk(&mut self) -> Result<Chunk>;

    /// Whether more chunks may follow.
    fn has_more(&self) -> bool {
        self.state() != StreamState::Terminal
    }

    /// Lazy iterator over the remaining chunks.
    fn chunks(&mut self) -> Chunks<'_, Self>
    where
        Self: Sized,
    {
        Chunks::new(self)
    }

    /// Byte-oriented reader over the remaining chunks.
    fn reader(&mut self) -> ChunkReader<'_, Self>
    where
        Self: Sized,
    {
        ChunkReader::new(self)
    }
}

// ---------------------------------------------------------------------------
// BlockStreamer
// ---------------------------------------------------------------------------

/// Generic pull engine: arena + state machine around a pump.
///
/// Not `Clone`: the pump owns live codec state.
pub struct BlockStreamer<P> {
    pub(crate) arena: BufferArena,
    pub(crate) state: StreamState,
    pub(crate) pump: P,
    options: StreamOptions,
    failed: bool,
    chunks_emitted: u64,
}

impl<P: Pump> BlockStreamer<P> {
    /// Build a stream over `source`, allocating the arena once.
    pub fn from_source(source: P::Source, framing: Framing, options: StreamOptions) -> Self {
        let options = StreamOptions {
            block_size: options.block_size.max(MIN_BLOCK_SIZE),
            ..options
        };
        Self {
            arena: BufferArena::new(options.block_size),
            state: StreamState::Unstarted,
            pump: P::new(source, framing, &options),
            options,
            failed: false,
            chunks_emitted: 0,
        }
    }

    /// Bind a new source and return to `Unstarted`, keeping the arena.
    pub(crate) fn rebind(&mut self, source: P::Source, framing: Framing) {
        debug!(
            "{}: rebinding ({:?} -> {:?}), previous state {:?}",
            P::DIRECTION,
            self.pump.framing(),
            framing,
            self.state
        );
        self.pump.rebind(source, framing);
        self.state = StreamState::Unstarted;
        self.failed = false;
        self.chunks_emitted = 0;
    }

    pub fn framing(&self) -> Framing {
        self.pump.framing()
    }

    pub fn options(&self) -> &StreamOptions {
        &self.options
    }

    /// Capacity of each arena buffer (the chunk size bound).
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Whether the last logical stream ended in an error.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Source bytes fed to the codec so far.
    pub fn consumed(&self) -> u64 {
        self.pump.total_in()
    }

    /// Bytes produced by the codec so far.
    pub fn produced(&self) -> u64 {
        self.pump.total_out()
    }

    /// Chunks returned since the last reset.
    pub fn chunks_emitted(&self) -> u64 {
        self.chunks_emitted
    }

    pub fn source(&self) -> &P::Source {
        self.pump.source()
    }

    fn fail(&mut self, err: StreamError) -> StreamError {
        debug!("{}: stream failed: {err}", P::DIRECTION);
        self.state = StreamState::Terminal;
        self.failed = true;
        err
    }

    /// Run codec calls until output appears or the stream ends.
    fn pull(&mut self) -> Result<Chunk> {
        loop {
            let progress = match self.pump.pump(&mut self.arena) {
                Ok(p) => p,
                Err(e) => return Err(self.fail(e)),
            };

            if progress.finished {
                self.state = StreamState::Terminal;
                debug!(
                    "{}: finished, {} bytes in ({} read from source), {} bytes out",
                    P::DIRECTION,
                    self.pump.total_in(),
                    self.pump.source().position(),
                    self.pump.total_out()
                );
            }

            if progress.produced > 0 || progress.finished {
                let chunk = self.arena.output[..progress.produced].to_vec();
                if !chunk.is_empty() {
                    self.chunks_emitted += 1;
                }
                trace!("{}: chunk of {} bytes", P::DIRECTION, chunk.len());
                return Ok(chunk);
            }
        }
    }
}

impl<P: Pump> BlockStream for BlockStreamer<P> {
    fn state(&self) -> StreamState {
        self.state
    }

    fn init(&mut self) -> Result<Chunk> {
        if self.state != StreamState::Unstarted {
            return Err(StreamError::State {
                operation: "init",
                state: self.state,
            });
        }
        debug!(
            "{}: init {:?} stream, block size {}",
            P::DIRECTION,
            self.pump.framing(),
            self.arena.capacity()
        );
        if let Err(e) = self.pump.prime(&self.options) {
            return Err(self.fail(e));
        }
        self.state = StreamState::Active;
        self.pull()
    }

    fn next_chunk(&mut self) -> Result<Chunk> {
        match self.state {
            StreamState::Unstarted => Err(StreamError::State {
                operation: "next_chunk",
                state: self.state,
            }),
            StreamState::Active => self.pull(),
            StreamState::Terminal if self.failed => Err(StreamError::Failed {
                operation: "next_chunk",
            }),
            StreamState::Terminal => Ok(Chunk::new()),
        }
    }
}

// ---------------------------------------------------------------------------
// Chunks iterator
// ---------------------------------------------------------------------------

/// Forward-only iterator over a stream's chunks.
///
/// Starts the stream if it is `Unstarted`. Yields nothing once the stream is
/// `Terminal`; restarting requires a reset on the stream itself.
pub struct Chunks<'s, S: ?Sized> {
    stream: &'s mut S,
}

impl<'s, S: BlockStream + ?Sized> Chunks<'s, S> {
    pub fn new(stream: &'s mut S) -> Self {
        Self { stream }
    }
}

impl<S: BlockStream + ?Sized> Iterator for Chunks<'_, S> {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        let chunk = match self.stream.state() {
            StreamState::Unstarted => self.stream.init(),
            StreamState::Active => self.stream.next_chunk(),
            StreamState::Terminal => return None,
        };
        match chunk {
            // Only the terminal chunk can be empty.
            Ok(c) if c.is_empty() => None,
            other => Some(other),
        }
    }
}

impl<S: BlockStream + ?Sized> std::iter::FusedIterator for Chunks<'_, S> {}

// ---------------------------------------------------------------------------
// ChunkReader
// ---------------------------------------------------------------------------

/// Copies from the current chunk's unread remainder, pulling the next chunk
/// when it runs dry. Returns 0 only at end of stream; a failed stream keeps
/// returning errors.
pub struct ChunkReader<'s, S: ?Sized> {
    stream: &'s mut S,
    current: Chunk,
    offset: usize,
}

impl<'s, S: BlockStream + ?Sized> ChunkReader<'s, S> {
    pub fn new(stream: &'s mut S) -> Self {
        Self {
            stream,
            current: Chunk::new(),
            offset: 0,
        }
    }

    /// Like `io::Read::read`, but keeps the stream error type.
    pub fn read_bytes(&mut self, dest: &mut [u8]) -> Result<usize> {
        if dest.is_empty() {
            return Ok(0);
        }

        while self.offset == self.current.len() {
            self.current = match self.stream.state() {
                StreamState::Unstarted => self.stream.init()?,
                StreamState::Active => self.stream.next_chunk()?,
                StreamState::Terminal => {
                    // Empty unless the stream failed, in which case it errors.
                    self.stream.next_chunk()?;
                    return Ok(0);
                }
            };
            self.offset = 0;
        }

        let n = dest.len().min(self.current.len() - self.offset);
        dest[..n].copy_from_slice(&self.current[self.offset..self.offset + n]);
        self.offset += n;
        Ok(n)
    }
}

impl<S: BlockStream + ?Sized> io::Read for ChunkReader<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_bytes(buf).map_err(io::Error::from)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

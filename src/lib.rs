//! Oxiflate: streaming DEFLATE compression with gzip and zlib framing.
//!
//! The crate provides:
//! - A codec wrapper over `flate2` (`codec`)
//! - Pull-based block streams over memory and file sources (`stream`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! Every stream moves through `Unstarted -> Active -> Terminal`. `init`
//! starts it and returns the first chunk; `next_chunk` keeps pulling until an
//! empty chunk marks the end. `reset` rebinds a stream for reuse while
//! keeping its buffers.
//!
//! # Quick Start
//!
//! ```no_run
//! use oxiflate::{BlockStream, CompressData, DecompressData, Framing};
//!
//! let text = b"the quick brown fox";
//!
//! let mut packed = Vec::new();
//! for chunk in CompressData::new(text, Framing::Gzip).chunks() {
//!     packed.extend(chunk.unwrap());
//! }
//! assert_eq!(&packed[..2], &[0x1f, 0x8b]);
//!
//! let mut unpacked = Vec::new();
//! for chunk in DecompressData::new(&packed, Framing::Gzip).chunks() {
//!     unpacked.extend(chunk.unwrap());
//! }
//! assert_eq!(unpacked, text);
//! ```

pub mod codec;
pub mod error;
pub mod io;
pub mod stream;

#[cfg(feature = "cli")]
pub mod cli;

pub use codec::{Flush, Framing};
pub use error::{CodecError, StreamError};
pub use stream::{
    BlockStream, Chunk, ChunkReader, Chunks, CompressData, CompressFile, DecompressData,
    DecompressFile, FileWindow, StreamOptions, StreamState,
};

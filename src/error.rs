// Error types shared by every stream variant.
//
// Two failure families reach callers:
//   - source I/O (the file cannot be opened or a read fails)
//   - codec (the DEFLATE engine rejects input or runs out of input)
//
// Both are fatal to the stream instance that raised them.

use std::io;
use std::path::PathBuf;

use crate::stream::StreamState;

/// Errors raised by the DEFLATE engine wrapper.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The compressor rejected its input or ran out of resources.
    #[error("compression failed: {0}")]
    Compress(#[from] flate2::CompressError),

    /// Malformed header, corrupt block data or checksum mismatch.
    #[error("decompression failed: {0}")]
    Decompress(#[from] flate2::DecompressError),

    /// The source ended before the compressed stream did.
    #[error("truncated compressed stream: input ended after {consumed} bytes")]
    Truncated { consumed: u64 },
}

/// Error type for all stream operations.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The file backing a stream could not be opened.
    #[error("cannot open file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A read from the bound file failed.
    #[error("source read failed: {0}")]
    Source(#[from] io::Error),

    /// The codec engine failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// An operation was called in a state that does not permit it.
    #[error("{operation} is not allowed while the stream is {state:?}")]
    State {
        operation: &'static str,
        state: StreamState,
    },

    /// An earlier pull failed; the stream stays failed until it is reset.
    #[error("{operation} after the stream failed; reset it first")]
    Failed { operation: &'static str },
}

impl StreamError {
    /// Whether this is a codec (as opposed to source I/O) failure.
    pub fn is_codec(&self) -> bool {
        matches!(self, Self::Codec(_))
    }
}

impl From<flate2::CompressError> for StreamError {
    fn from(e: flate2::CompressError) -> Self {
        Self::Codec(CodecError::Compress(e))
    }
}

impl From<flate2::DecompressError> for StreamError {
    fn from(e: flate2::DecompressError) -> Self {
        Self::Codec(CodecError::Decompress(e))
    }
}

impl From<StreamError> for io::Error {
    fn from(e: StreamError) -> Self {
        match e {
            StreamError::Source(inner) => inner,
            StreamError::Open { source, .. } => source,
            other @ StreamError::Codec(_) => io::Error::new(io::ErrorKind::InvalidData, other),
            other @ (StreamError::State { .. } | StreamError::Failed { .. }) => {
                io::Error::other(other)
            }
        }
    }
}

/// Result alias for stream operations.
pub type Result<T> = std::result::Result<T, StreamError>;

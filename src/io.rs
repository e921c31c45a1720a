// File-level helpers for compressing/decompressing whole files.
//
// `compress_to()` and `decompress_to()` drive the file stream variants and
// write every chunk through a `BufWriter`; the `_file` forms create the
// output path first. Optionally computes a streaming SHA-256 of the
// uncompressed payload in the same pass (feature-gated behind `file-io`).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::debug;
#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::codec::Framing;
use crate::error::StreamError;
use crate::stream::{
    BlockStream, CompressFile, DecompressFile, FileSource, FileWindow, StreamOptions,
};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `compress_file()`.
#[derive(Debug, Clone)]
pub struct CompressStats {
    /// Uncompressed bytes read from the input window.
    pub input_size: u64,
    /// Compressed bytes written.
    pub output_size: u64,
    /// Number of chunks pulled from the stream.
    pub chunks: u64,
    /// SHA-256 of the uncompressed input (if `file-io` feature is enabled).
    pub sha256: Option<[u8; 32]>,
}

/// Statistics returned by `decompress_file()`.
#[derive(Debug, Clone)]
pub struct DecompressStats {
    /// Compressed bytes consumed.
    pub input_size: u64,
    /// Decompressed bytes written.
    pub output_size: u64,
    /// Number of chunks pulled from the stream.
    pub chunks: u64,
    /// SHA-256 of the decompressed output (if `file-io` feature is enabled).
    pub sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file helpers.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    /// The output file could not be created or written.
    #[error("output error: {0}")]
    Output(#[from] io::Error),
    /// Opening, reading or decoding the input failed.
    #[error(transparent)]
    Stream(#[from] StreamError),
}

// ---------------------------------------------------------------------------
// Default buffer size
// ---------------------------------------------------------------------------

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// compress
// ---------------------------------------------------------------------------

/// Compress `window` of `input_path` into a new file at `output_path`.
pub fn compress_file(
    input_path: &Path,
    output_path: &Path,
    window: FileWindow,
    framing: Framing,
    opts: StreamOptions,
) -> Result<CompressStats, FileError> {
    compress_to(input_path, window, framing, opts, File::create(output_path)?)
}

/// Compress `window` of `input_path` into `writer`.
pub fn compress_to<W: Write>(
    input_path: &Path,
    window: FileWindow,
    framing: Framing,
    opts: StreamOptions,
    writer: W,
) -> Result<CompressStats, FileError> {
    let input = open_input(input_path)?;
    let source = FileSource::attach(&input, window);
    #[cfg(feature = "file-io")]
    let source = source.with_digest();
    let mut stream = CompressFile::from_source(source, framing, opts);

    let mut writer = BufWriter::with_capacity(BUF_SIZE, writer);
    let (output_size, chunks) = copy_chunks(&mut stream, &mut writer)?;
    writer.flush()?;

    #[cfg(feature = "file-io")]
    let sha256 = stream.source().digest();
    #[cfg(not(feature = "file-io"))]
    let sha256: Option<[u8; 32]> = None;

    debug!(
        "compressed {}: {} -> {output_size} bytes in {chunks} chunks",
        input_path.display(),
        stream.consumed()
    );

    Ok(CompressStats {
        input_size: stream.consumed(),
        output_size,
        chunks,
        sha256,
    })
}

// ---------------------------------------------------------------------------
// decompress
// ---------------------------------------------------------------------------

/// Decompress `window` of `input_path` into a new file at `output_path`.
pub fn decompress_file(
    input_path: &Path,
    output_path: &Path,
    window: FileWindow,
    framing: Framing,
    opts: StreamOptions,
) -> Result<DecompressStats, FileError> {
    decompress_to(input_path, window, framing, opts, File::create(output_path)?)
}

/// Decompress `window` of `input_path` into `writer`.
pub fn decompress_to<W: Write>(
    input_path: &Path,
    window: FileWindow,
    framing: Framing,
    opts: StreamOptions,
    writer: W,
) -> Result<DecompressStats, FileError> {
    let input = open_input(input_path)?;
    let mut stream = DecompressFile::attach_with_options(&input, window, framing, opts);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, writer);

    #[cfg(feature = "file-io")]
    let (output_size, chunks, sha256) = {
        let mut hasher = sha2::Sha256::new();
        let mut hashing = HashingWriter {
            inner: &mut writer,
            hasher: &mut hasher,
        };
        let (size, chunks) = copy_chunks(&mut stream, &mut hashing)?;
        (size, chunks, Some(hasher.finalize().into()))
    };
    #[cfg(not(feature = "file-io"))]
    let (output_size, chunks, sha256) = {
        let (size, chunks) = copy_chunks(&mut stream, &mut writer)?;
        (size, chunks, None)
    };

    writer.flush()?;

    debug!(
        "decompressed {}: {} -> {output_size} bytes in {chunks} chunks",
        input_path.display(),
        stream.consumed()
    );

    Ok(DecompressStats {
        input_size: stream.consumed(),
        output_size,
        chunks,
        sha256,
    })
}

fn open_input(path: &Path) -> Result<File, StreamError> {
    File::open(path).map_err(|source| StreamError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Pull every chunk from `stream` into `writer`.
fn copy_chunks<S: BlockStream, W: Write>(
    stream: &mut S,
    writer: &mut W,
) -> Result<(u64, u64), FileError> {
    let mut written = 0u64;
    let mut chunks = 0u64;
    for chunk in stream.chunks() {
        let chunk = chunk?;
        writer.write_all(&chunk)?;
        written += chunk.len() as u64;
        chunks += 1;
    }
    Ok((written, chunks))
}

// ---------------------------------------------------------------------------
// Hashing helpers (used with file-io feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "file-io")]
struct HashingWriter<'a, W: Write> {
    inner: &'a mut W,
    hasher: &'a mut sha2::Sha256,
}

#[cfg(feature = "file-io")]
impl<W: Write> Write for HashingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

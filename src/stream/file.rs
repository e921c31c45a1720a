// File-backed stream variants.
//
// A stream either opens a path itself (and closes it on drop or rebind) or
// attaches to a caller-owned `File` and a byte window of it. Reads are
// positional, so several streams may share one attached `File` as long as
// each is driven by a single caller.

use std::fs::File;
use std::path::Path;

use crate::codec::Framing;
use crate::error::Result;

use super::pump::{Deflater, Inflater, Pump};
use super::source::{FileSource, FileWindow};
use super::{BlockStreamer, StreamOptions};

/// Compresses a file or a byte window of one.
pub type CompressFile<'a> = BlockStreamer<Deflater<FileSource<'a>>>;

/// Decompresses a file or a byte window of one.
pub type DecompressFile<'a> = BlockStreamer<Inflater<FileSource<'a>>>;

impl<'a, P> BlockStreamer<P>
where
    P: Pump<Source = FileSource<'a>>,
{
    /// Open `path` read-only and stream the whole file.
    pub fn open(path: impl AsRef<Path>, framing: Framing) -> Result<Self> {
        Self::open_with_options(path, framing, StreamOptions::default())
    }

    pub fn open_with_options(
        path: impl AsRef<Path>,
        framing: Framing,
        options: StreamOptions,
    ) -> Result<Self> {
        let source = FileSource::open(path.as_ref())?;
        Ok(Self::from_source(source, framing, options))
    }

    /// Stream `window` of a caller-owned file. The file is never closed by
    /// the stream.
    pub fn attach(file: &'a File, window: FileWindow, framing: Framing) -> Self {
        Self::attach_with_options(file, window, framing, StreamOptions::default())
    }

    pub fn attach_with_options(
        file: &'a File,
        window: FileWindow,
        framing: Framing,
        options: StreamOptions,
    ) -> Self {
        Self::from_source(FileSource::attach(file, window), framing, options)
    }

    /// Rebind to a newly opened path. A previously owned descriptor is closed.
    pub fn reset_path(&mut self, path: impl AsRef<Path>, framing: Framing) -> Result<()> {
        let source = FileSource::open(path.as_ref())?;
        self.rebind(source, framing);
        Ok(())
    }

    /// Rebind to a window of a caller-owned file. A previously owned
    /// descriptor is closed.
    pub fn reset_attached(&mut self, file: &'a File, window: FileWindow, framing: Framing) {
        self.rebind(FileSource::attach(file, window), framing);
    }

    /// Whether the stream closes its descriptor on teardown.
    pub fn owns_descriptor(&self) -> bool {
        self.source().owns_descriptor()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Byte sources feeding a stream's input buffer.
//
// MemorySource: a borrowed slice plus a cursor.
// FileSource:   a file (owned or borrowed) plus a byte window, read with
//               positional reads so the descriptor offset is left alone.
//               Unbounded windows read until a read reports end of file.

use std::fs::File;
use std::io::{self, Seek};
use std::path::Path;

use log::debug;

use crate::error::{Result, StreamError};

/// Supplies raw bytes to a pump, one staged block at a time.
pub trait Source {
    /// Rewind to the start of the bound data. Called on every `init`.
    fn prepare(&mut self) -> Result<()>;

    /// Copy the next bytes into `buf`. Fills `buf` completely unless the
    /// source ends first.
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// No bytes remain.
    fn is_exhausted(&self) -> bool;

    /// Bytes handed out since the last `prepare`.
    fn position(&self) -> u64;
}

// ---------------------------------------------------------------------------
// MemorySource
// ---------------------------------------------------------------------------

/// Borrowed in-memory bytes with a read cursor (`cursor <= data.len()`).
#[derive(Debug, Clone, Copy, Default)]
pub struct MemorySource<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> MemorySource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0 }
    }
}

impl Source for MemorySource<'_> {
    fn prepare(&mut self) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = buf.len().min(self.data.len() - self.cursor);
        buf[..n].copy_from_slice(&self.data[self.cursor..self.cursor + n]);
        self.cursor += n;
        Ok(n)
    }

    fn is_exhausted(&self) -> bool {
        self.cursor == self.data.len()
    }

    fn position(&self) -> u64 {
        self.cursor as u64
    }
}

// ---------------------------------------------------------------------------
// FileWindow
// ---------------------------------------------------------------------------

/// Byte range of a file to stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileWindow {
    /// Start offset; `None` means the descriptor's current position.
    pub offset: Option<u64>,
    /// Length; `None` means up to end of file.
    pub len: Option<u64>,
}

impl FileWindow {
    /// The whole file from offset 0.
    pub fn whole() -> Self {
        Self {
            offset: Some(0),
            len: None,
        }
    }

    /// `len` bytes starting at `offset`.
    pub fn range(offset: u64, len: u64) -> Self {
        Self {
            offset: Some(offset),
            len: Some(len),
        }
    }

    /// Everything from `offset` to end of file.
    pub fn from_offset(offset: u64) -> Self {
        Self {
            offset: Some(offset),
            len: None,
        }
    }

    /// Signed form where negative values mean "current position" for the
    /// offset and "unbounded" for the length.
    pub fn from_signed(offset: i64, len: i64) -> Self {
        Self {
            offset: u64::try_from(offset).ok(),
            len: u64::try_from(len).ok(),
        }
    }
}

// ---------------------------------------------------------------------------
// FileSource
// ---------------------------------------------------------------------------

/// A file handle that is either owned by the stream or lent by the caller.
#[derive(Debug)]
enum Handle<'a> {
    Owned(File),
    Attached(&'a File),
}

/// A byte window of a file.
///
/// Files opened by path are owned and closed when the source is dropped or
/// replaced; attached files are never closed. The file size is never
/// consulted: reads go until the window length is used up or a read returns
/// end of file, whichever comes first. After every full block one byte is
/// read ahead, so the block holding the last byte is known as such.
pub struct FileSource<'a> {
    handle: Handle<'a>,
    window: FileWindow,
    start: u64,
    /// Window bytes not yet handed out (including `peeked`); `None` reads to
    /// end of file.
    remaining: Option<u64>,
    /// Bytes read from the file since `prepare`, including `peeked`.
    fetched: u64,
    peeked: Option<u8>,
    eof: bool,
    #[cfg(feature = "file-io")]
    digest: Option<sha2::Sha256>,
}

impl std::fmt::Debug for FileSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSource")
            .field("handle", &self.handle)
            .field("window", &self.window)
            .field("start", &self.start)
            .field("remaining", &self.remaining)
            .field("fetched", &self.fetched)
            .field("eof", &self.eof)
            .finish_non_exhaustive()
    }
}

impl<'a> FileSource<'a> {
    /// Open `path` read-only; the source owns the descriptor.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| StreamError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("opened {} for streaming", path.display());
        Ok(Self::with_handle(Handle::Owned(file), FileWindow::whole()))
    }

    /// Stream `window` of a caller-owned file.
    pub fn attach(file: &'a File, window: FileWindow) -> Self {
        Self::with_handle(Handle::Attached(file), window)
    }

    fn with_handle(handle: Handle<'a>, window: FileWindow) -> Self {
        Self {
            handle,
            window,
            start: window.offset.unwrap_or(0),
            remaining: window.len,
            fetched: 0,
            peeked: None,
            eof: false,
            #[cfg(feature = "file-io")]
            digest: None,
        }
    }

    /// Keep a SHA-256 of every byte handed out, restarted on each `prepare`.
    #[cfg(feature = "file-io")]
    pub fn with_digest(mut self) -> Self {
        self.digest = Some(sha2::Sha256::default());
        self
    }

    /// SHA-256 of the bytes handed out since the last `prepare`, if enabled.
    #[cfg(feature = "file-io")]
    pub fn digest(&self) -> Option<[u8; 32]> {
        use sha2::Digest;
        self.digest.clone().map(|h| h.finalize().into())
    }

    /// Whether dropping this source closes the descriptor.
    pub fn owns_descriptor(&self) -> bool {
        matches!(self.handle, Handle::Owned(_))
    }

    fn file(&self) -> &File {
        match &self.handle {
            Handle::Owned(f) => f,
            Handle::Attached(f) => f,
        }
    }

    /// Positional reads into `buf` until it is full or the file ends.
    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            let offset = self.start + self.fetched;
            match read_at(self.file(), &mut buf[filled..], offset) {
                Ok(0) => {
                    self.eof = true;
                    break;
                }
                Ok(n) => {
                    filled += n;
                    self.fetched += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(StreamError::Source(e)),
            }
        }
        Ok(filled)
    }
}

impl Source for FileSource<'_> {
    fn prepare(&mut self) -> Result<()> {
        self.start = match self.window.offset {
            Some(offset) => offset,
            None => {
                let mut file = self.file();
                file.stream_position()?
            }
        };
        self.remaining = self.window.len;
        self.fetched = 0;
        self.peeked = None;
        self.eof = false;
        #[cfg(feature = "file-io")]
        if self.digest.is_some() {
            self.digest = Some(sha2::Sha256::default());
        }
        Ok(())
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        let want = match self.remaining {
            Some(r) => usize::try_from(r).map_or(buf.len(), |r| r.min(buf.len())),
            None => buf.len(),
        };
        let mut filled = 0;
        if want > 0
            && let Some(byte) = self.peeked.take()
        {
            buf[0] = byte;
            filled = 1;
        }
        if !self.eof {
            filled += self.read_into(&mut buf[filled..want])?;
        }

        if let Some(r) = self.remaining.as_mut() {
            *r -= filled as u64;
            if self.eof && *r > 0 {
                debug!("window at {} ends at end of file, {r} bytes short", self.start);
            }
        }
        #[cfg(feature = "file-io")]
        if let Some(h) = self.digest.as_mut() {
            sha2::Digest::update(h, &buf[..filled]);
        }

        if filled == buf.len() && !self.eof && self.remaining != Some(0) {
            let mut one = [0u8; 1];
            if self.read_into(&mut one)? == 1 {
                self.peeked = Some(one[0]);
            }
        }
        Ok(filled)
    }

    fn is_exhausted(&self) -> bool {
        self.remaining == Some(0) || (self.eof && self.peeked.is_none())
    }

    fn position(&self) -> u64 {
        self.fetched - u64::from(self.peeked.is_some())
    }
}

impl Drop for FileSource<'_> {
    fn drop(&mut self) {
        if self.owns_descriptor() {
            debug!("closing owned descriptor after {} bytes", self.position());
        }
    }
}

#[cfg(unix)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    std::os::unix::fs::FileExt::read_at(file, buf, offset)
}

#[cfg(windows)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    std::os::windows::fs::FileExt::seek_read(file, buf, offset)
}

#[cfg(not(any(unix, windows)))]
fn read_at(mut file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::io::{Read, SeekFrom};
    file.seek(SeekFrom::Start(offset))?;
    file.read(buf)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

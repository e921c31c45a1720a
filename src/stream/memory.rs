// In-memory stream variants.
//
// Both borrow their input for the lifetime of the stream; `reset` and
// `add_data` rebind a new slice without reallocating the arena.

use crate::codec::{Flush, Framing};
use crate::error::{Result, StreamError};

use super::pump::{Deflater, Inflater, Pump};
use super::source::MemorySource;
use super::{BlockStreamer, StreamOptions, StreamState};

/// Compresses a borrowed byte slice.
pub type CompressData<'a> = BlockStreamer<Deflater<MemorySource<'a>>>;

/// Decompresses a borrowed byte slice.
pub type DecompressData<'a> = BlockStreamer<Inflater<MemorySource<'a>>>;

impl<'a, P> BlockStreamer<P>
where
    P: Pump<Source = MemorySource<'a>>,
{
    pub fn new(data: &'a [u8], framing: Framing) -> Self {
        Self::with_options(data, framing, StreamOptions::default())
    }

    pub fn with_options(data: &'a [u8], framing: Framing, options: StreamOptions) -> Self {
        Self::from_source(MemorySource::new(data), framing, options)
    }

    /// Bind new data and framing; the next pull starts a fresh stream.
    pub fn reset(&mut self, data: &'a [u8], framing: Framing) {
        self.rebind(MemorySource::new(data), framing);
    }

    /// Bind new data, keeping the current framing.
    pub fn add_data(&mut self, data: &'a [u8]) {
        let framing = self.framing();
        self.reset(data, framing);
    }
}

impl CompressData<'_> {
    /// Compress caller-supplied bytes with an explicit flush, bypassing the
    /// bound data. Requires an `Active` stream.
    ///
    /// All output is returned at once and may exceed the arena capacity.
    /// `Flush::Finish` ends the stream.
    pub fn push(&mut self, input: &[u8], flush: Flush) -> Result<Vec<u8>> {
        if self.state != StreamState::Active {
            return Err(StreamError::State {
                operation: "push",
                state: self.state,
            });
        }
        let (out, finished) = self.pump.push(input, flush, &mut self.arena.output)?;
        if finished {
            self.state = StreamState::Terminal;
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

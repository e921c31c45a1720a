// Per-stream scratch memory.
//
// Every stream allocates its arena once at construction; resets and rebinds
// reuse it, so steady-state pulling never allocates scratch space.

/// Two fixed-capacity scratch buffers owned by one stream instance.
///
/// `input` stages raw bytes read from a source, `output` receives codec
/// output. Both are allocated once and never resized; resetting a stream
/// keeps them.
#[derive(Debug)]
pub struct BufferArena {
    pub(crate) input: Box<[u8]>,
    pub(crate) output: Box<[u8]>,
}

impl BufferArena {
    pub fn new(capacity: usize) -> Self {
        Self {
            input: vec![0u8; capacity].into_boxed_slice(),
            output: vec![0u8; capacity].into_boxed_slice(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.output.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_share_capacity() {
        let arena = BufferArena::new(512);
        assert_eq!(arena.capacity(), 512);
        assert_eq!(arena.input.len(), 512);
        assert_eq!(arena.output.len(), 512);
    }
}

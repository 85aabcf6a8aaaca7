//! Fixed-capacity fragmentation buffer

use bytes::{Bytes, BytesMut};

/// Accumulates bytes for the next frame
///
/// The buffer alternates between filling ([`append`](Self::append)) and
/// draining ([`drain`](Self::drain)). A drained payload shares storage with
/// the buffer only until the payload is dropped; the next fill cycle never
/// writes into bytes still referenced by an in-flight frame.
#[derive(Debug)]
pub struct FragmentBuffer {
    buf: BytesMut,
    capacity: usize,
}

impl FragmentBuffer {
    /// Wrap a region supplied by a buffer pool
    pub fn new(mut buf: BytesMut, capacity: usize) -> Self {
        buf.clear();
        buf.reserve(capacity);
        Self { buf, capacity }
    }

    /// Bytes a full frame holds
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes buffered for the next frame
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Room left before the buffer is full
    pub fn remaining(&self) -> usize {
        self.capacity - self.buf.len()
    }

    /// Whether the next append must wait for a drain
    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    /// Copy as much of `data` as fits; returns the number of bytes taken
    pub fn append(&mut self, data: &[u8]) -> usize {
        debug_assert!(
            data.is_empty() || !self.is_full(),
            "append to a full fragment buffer"
        );
        let take = data.len().min(self.remaining());
        self.buf.extend_from_slice(&data[..take]);
        take
    }

    /// Take the accumulated bytes as a frame payload and start a new fill cycle
    pub fn drain(&mut self) -> Bytes {
        let payload = self.buf.split().freeze();
        self.buf.reserve(self.capacity);
        payload
    }

    /// Hand back the underlying region; the buffer has no capacity afterwards
    pub fn release(&mut self) -> BytesMut {
        self.capacity = 0;
        std::mem::take(&mut self.buf)
    }
}

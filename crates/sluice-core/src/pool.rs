//! Byte region supply for outbound buffers
//!
//! Streams ask a [`BufferPool`] for a region at construction and hand it back
//! once the message is finished. Where the region comes from is up to the
//! pool implementation.

use bytes::BytesMut;
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Supplier of reusable byte regions
pub trait BufferPool: Send + Sync {
    /// Get an empty buffer with room for at least `capacity` bytes
    fn acquire(&self, capacity: usize) -> BytesMut;

    /// Return a buffer obtained from [`BufferPool::acquire`]
    fn release(&self, buffer: BytesMut);
}

/// Allocates a fresh region on every acquire
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapBufferPool;

impl BufferPool for HeapBufferPool {
    fn acquire(&self, capacity: usize) -> BytesMut {
        BytesMut::with_capacity(capacity)
    }

    fn release(&self, _buffer: BytesMut) {}
}

/// Keeps released buffers in per-capacity buckets for reuse
///
/// An acquire is served from the smallest bucket that is large enough.
#[derive(Debug)]
pub struct ArrayBufferPool {
    max_retained: usize,
    buckets: Mutex<BTreeMap<usize, Vec<BytesMut>>>,
}

impl ArrayBufferPool {
    /// Create a pool retaining at most `max_retained` buffers per capacity
    pub fn new(max_retained: usize) -> Self {
        Self {
            max_retained,
            buckets: Mutex::new(BTreeMap::new()),
        }
    }

    /// Number of idle buffers currently held
    pub fn retained(&self) -> usize {
        self.buckets.lock().values().map(Vec::len).sum()
    }
}

impl Default for ArrayBufferPool {
    fn default() -> Self {
        Self::new(16)
    }
}

impl BufferPool for ArrayBufferPool {
    fn acquire(&self, capacity: usize) -> BytesMut {
        let reused = {
            let mut buckets = self.buckets.lock();
            // Buckets are never left empty, so the first key in range has a buffer
            let key = buckets.range(capacity..).next().map(|(&key, _)| key);
            key.and_then(|key| {
                let bucket = buckets.get_mut(&key)?;
                let buffer = bucket.pop();
                if bucket.is_empty() {
                    buckets.remove(&key);
                }
                buffer
            })
        };

        match reused {
            Some(mut buffer) => {
                buffer.clear();
                buffer.reserve(capacity);
                buffer
            }
            None => BytesMut::with_capacity(capacity),
        }
    }

    fn release(&self, mut buffer: BytesMut) {
        let capacity = buffer.capacity();
        if capacity == 0 || self.max_retained == 0 {
            return;
        }
        buffer.clear();

        let mut buckets = self.buckets.lock();
        let bucket = buckets.entry(capacity).or_default();
        if bucket.len() < self.max_retained {
            bucket.push(buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heap_pool_capacity() {
        let buffer = HeapBufferPool.acquire(64);
        assert!(buffer.is_empty());
        assert!(buffer.capacity() >= 64);
    }

    #[test]
    fn test_array_pool_reuses_released() {
        let pool = ArrayBufferPool::new(2);
        let mut buffer = pool.acquire(128);
        let capacity = buffer.capacity();
        buffer.extend_from_slice(b"stale");
        pool.release(buffer);
        assert_eq!(pool.retained(), 1);

        let reused = pool.acquire(capacity);
        assert!(reused.is_empty());
        assert!(reused.capacity() >= capacity);
        assert_eq!(pool.retained(), 0);
    }

    #[test]
    fn test_array_pool_retention_limit() {
        let pool = ArrayBufferPool::new(1);
        pool.release(BytesMut::with_capacity(32));
        pool.release(BytesMut::with_capacity(32));
        assert_eq!(pool.retained(), 1);
    }

    #[test]
    fn test_array_pool_drops_drained_buckets() {
        let pool = ArrayBufferPool::new(4);
        for capacity in [16, 32, 64] {
            let buffer = pool.acquire(capacity);
            pool.release(buffer);
        }
        assert_eq!(pool.buckets.lock().len(), 3);

        for capacity in [16, 32, 64] {
            let _ = pool.acquire(capacity);
        }
        assert_eq!(pool.retained(), 0);
        assert!(pool.buckets.lock().is_empty());
    }

    #[test]
    fn test_array_pool_zero_retention_keeps_nothing() {
        let pool = ArrayBufferPool::new(0);
        pool.release(BytesMut::with_capacity(32));
        assert!(pool.buckets.lock().is_empty());
    }

    #[test]
    fn test_array_pool_ignores_empty_region() {
        let pool = ArrayBufferPool::default();
        pool.release(BytesMut::new());
        assert_eq!(pool.retained(), 0);
    }
}

//! Buffer pools the adapter rents its staging buffer from.

use std::cell::RefCell;
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::PoolConfig;

/// A source of reusable byte buffers.
///
/// Implementations must be safe to call from several adapters at once; a
/// single adapter performs no locking of its own.
pub trait BufferPool {
    /// Rents a buffer whose `len()` is at least `min_size`.
    ///
    /// The contents are unspecified and may hold stale bytes.
    fn rent(&self, min_size: usize) -> Vec<u8>;

    /// Hands a buffer back. The caller must not use it afterwards.
    fn release(&self, buf: Vec<u8>);
}

impl<P: BufferPool + ?Sized> BufferPool for &P {
    fn rent(&self, min_size: usize) -> Vec<u8> {
        (**self).rent(min_size)
    }

    fn release(&self, buf: Vec<u8>) {
        (**self).release(buf)
    }
}

impl<P: BufferPool + ?Sized> BufferPool for Arc<P> {
    fn rent(&self, min_size: usize) -> Vec<u8> {
        (**self).rent(min_size)
    }

    fn release(&self, buf: Vec<u8>) {
        (**self).release(buf)
    }
}

/// Picks the first pooled buffer that can hold `min_size` bytes.
fn take_fitting(pool: &mut Vec<Vec<u8>>, min_size: usize) -> Option<Vec<u8>> {
    let idx = pool.iter().position(|b| b.capacity() >= min_size)?;
    Some(pool.swap_remove(idx))
}

/// Expands a buffer so its whole capacity is addressable.
///
/// Only bytes beyond the previous length get zeroed, so a reused buffer is
/// filled at most once.
fn fit(mut buf: Vec<u8>, min_size: usize) -> Vec<u8> {
    let size = buf.capacity().max(min_size);
    buf.resize(size, 0);
    buf
}

fn allocate(min_size: usize) -> Vec<u8> {
    let size = min_size.checked_next_power_of_two().unwrap_or(min_size);
    vec![0u8; size]
}

/// Per-thread buffer pool. This is the default pool.
///
/// All `ThreadLocalPool` values on a thread share the same storage; the
/// [`PoolConfig`] of the releasing pool decides whether a buffer is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadLocalPool {
    config: PoolConfig,
}

impl ThreadLocalPool {
    /// Creates a pool handle with the default retention policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pool handle with a custom retention policy.
    pub fn with_config(config: PoolConfig) -> Self {
        Self { config }
    }

    /// Number of buffers currently pooled on this thread.
    pub fn pooled(&self) -> usize {
        THREAD_BUFFER_POOL.with(|pool| pool.borrow().len())
    }
}

impl BufferPool for ThreadLocalPool {
    fn rent(&self, min_size: usize) -> Vec<u8> {
        let reused = THREAD_BUFFER_POOL.with(|pool| take_fitting(&mut pool.borrow_mut(), min_size));
        match reused {
            Some(buf) => fit(buf, min_size),
            None => allocate(min_size),
        }
    }

    fn release(&self, buf: Vec<u8>) {
        THREAD_BUFFER_POOL.with(|pool| {
            let mut pool = pool.borrow_mut();
            if self.config.retains(buf.capacity(), pool.len()) {
                pool.push(buf);
            }
        });
    }
}

// Thread-local buffer pool
thread_local! {
    static THREAD_BUFFER_POOL: RefCell<Vec<Vec<u8>>> = const { RefCell::new(Vec::new()) };
}

/// Buffer pool shared across threads behind a mutex.
///
/// Cloning yields another handle to the same pool.
#[derive(Debug, Clone, Default)]
pub struct SharedPool {
    buffers: Arc<Mutex<Vec<Vec<u8>>>>,
    config: PoolConfig,
}

impl SharedPool {
    /// Creates an empty pool with the default retention policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty pool with a custom retention policy.
    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            buffers: Arc::default(),
            config,
        }
    }

    /// Number of buffers currently pooled.
    pub fn pooled(&self) -> usize {
        self.buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl BufferPool for SharedPool {
    fn rent(&self, min_size: usize) -> Vec<u8> {
        let reused = {
            let mut buffers = self.buffers.lock().unwrap_or_else(PoisonError::into_inner);
            take_fitting(&mut buffers, min_size)
        };
        match reused {
            Some(buf) => fit(buf, min_size),
            None => allocate(min_size),
        }
    }

    fn release(&self, buf: Vec<u8>) {
        let mut buffers = self.buffers.lock().unwrap_or_else(PoisonError::into_inner);
        if self.config.retains(buf.capacity(), buffers.len()) {
            buffers.push(buf);
        }
    }
}

/// A pool that never reuses anything: every rent allocates exactly the
/// requested size and every release frees.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapPool;

impl BufferPool for HeapPool {
    fn rent(&self, min_size: usize) -> Vec<u8> {
        vec![0u8; min_size]
    }

    fn release(&self, _buf: Vec<u8>) {}
}

/// Exact-size pool that records every rent and release.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct CountingPool {
    pub(crate) rented: std::cell::RefCell<Vec<usize>>,
    pub(crate) released: std::cell::Cell<usize>,
}

#[cfg(test)]
impl BufferPool for CountingPool {
    fn rent(&self, min_size: usize) -> Vec<u8> {
        self.rented.borrow_mut().push(min_size);
        vec![0u8; min_size]
    }

    fn release(&self, _buf: Vec<u8>) {
        self.released.set(self.released.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_local_rent() {
        let pool = ThreadLocalPool::new();
        let buf = pool.rent(100);
        assert!(buf.len() >= 100);
    }

    #[test]
    fn test_thread_local_reuse() {
        let pool = ThreadLocalPool::new();
        // Take a buffer, put some data in it, then give it back
        let mut buf = pool.rent(64);
        buf[..9].copy_from_slice(b"test data");
        let ptr = buf.as_ptr();
        pool.release(buf);

        // The same allocation should come back
        let buf2 = pool.rent(32);
        assert_eq!(buf2.as_ptr(), ptr);
        assert!(buf2.len() >= 64);
        pool.release(buf2);
    }

    #[test]
    fn test_thread_local_skips_too_small() {
        let pool = ThreadLocalPool::new();
        let small = pool.rent(16);
        pool.release(small);

        let big = pool.rent(1024);
        assert!(big.len() >= 1024);
        // The small buffer stays pooled
        assert!(pool.pooled() >= 1);
    }

    #[test]
    fn test_thread_local_drops_oversized() {
        let pool = ThreadLocalPool::with_config(PoolConfig::new(4, 256).unwrap());
        let before = pool.pooled();
        pool.release(vec![0u8; 1024]);
        assert_eq!(pool.pooled(), before);
    }

    #[test]
    fn test_shared_pool_across_threads() {
        let pool = SharedPool::new();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let pool = pool.clone();
                std::thread::spawn(move || {
                    let buf = pool.rent(32 * (i + 1));
                    assert!(buf.len() >= 32 * (i + 1));
                    pool.release(buf);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(pool.pooled() >= 1);
        assert!(pool.pooled() <= crate::config::DEFAULT_MAX_POOLED);
    }

    #[test]
    fn test_shared_pool_retention_limit() {
        let pool = SharedPool::with_config(PoolConfig::new(1, 1024).unwrap());
        pool.release(vec![0u8; 8]);
        pool.release(vec![0u8; 8]);
        assert_eq!(pool.pooled(), 1);
    }

    #[test]
    fn test_heap_pool_exact_size() {
        let buf = HeapPool.rent(10);
        assert_eq!(buf.len(), 10);
    }

    #[test]
    fn test_pool_by_reference_and_arc() {
        let pool = SharedPool::new();
        let by_ref: &SharedPool = &pool;
        by_ref.release(by_ref.rent(8));

        let arc = Arc::new(HeapPool);
        assert_eq!(arc.rent(3).len(), 3);
    }
}

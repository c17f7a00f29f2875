//! Lookahead staging area backed by a pooled buffer.

use super::BufferPool;

/// Holds bytes pulled from a source but not yet delivered to the consumer.
///
/// Live bytes occupy `buf[consumed..len]`. The buffer is rented lazily, and
/// handed back to the pool as soon as the live region is empty, through
/// [`StagingBuffer::release`] only.
pub(crate) struct StagingBuffer<P: BufferPool> {
    pool: P,
    buf: Option<Vec<u8>>,
    len: usize,
    consumed: usize,
    min_grow: usize,
}

impl<P: BufferPool> StagingBuffer<P> {
    pub(crate) fn new(pool: P, min_grow: usize) -> Self {
        Self {
            pool,
            buf: None,
            len: 0,
            consumed: 0,
            min_grow,
        }
    }

    pub(crate) fn pool(&self) -> &P {
        &self.pool
    }

    pub(crate) fn is_allocated(&self) -> bool {
        self.buf.is_some()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.buf.as_ref().map_or(0, Vec::len)
    }

    /// Staged bytes not yet delivered.
    pub(crate) fn live(&self) -> &[u8] {
        match &self.buf {
            Some(buf) => &buf[self.consumed..self.len],
            None => &[],
        }
    }

    pub(crate) fn live_len(&self) -> usize {
        self.len - self.consumed
    }

    /// Makes room for `n` more staged bytes and returns that spare region.
    ///
    /// Rents on first use, otherwise compacts in place when the live bytes
    /// plus `n` fit the current buffer, otherwise moves to a larger one.
    /// Whatever gets written to the region only counts after [`commit`].
    ///
    /// [`commit`]: StagingBuffer::commit
    pub(crate) fn reserve(&mut self, n: usize) -> &mut [u8] {
        let pool = &self.pool;
        let min_grow = self.min_grow;
        let fresh = self.buf.is_none();
        let buf = self.buf.get_or_insert_with(|| {
            let size = n.max(min_grow);
            #[cfg(feature = "tracing")]
            tracing::trace!(size, "renting staging buffer");
            pool.rent(size)
        });

        if !fresh && buf.len() - self.len < n {
            let live = self.len - self.consumed;
            if live + n <= buf.len() {
                #[cfg(feature = "tracing")]
                tracing::trace!(live, shift = self.consumed, "compacting staging buffer");
                buf.copy_within(self.consumed..self.len, 0);
            } else {
                let size = (live + n).max(min_grow);
                #[cfg(feature = "tracing")]
                tracing::trace!(live, from = buf.len(), size, "growing staging buffer");
                let mut grown = pool.rent(size);
                grown[..live].copy_from_slice(&buf[self.consumed..self.len]);
                pool.release(std::mem::replace(buf, grown));
            }
            self.len = live;
            self.consumed = 0;
        }

        debug_assert!(buf.len() - self.len >= n, "pool returned a short buffer");
        &mut buf[self.len..self.len + n]
    }

    /// Marks `n` bytes of the last reserved region as staged.
    pub(crate) fn commit(&mut self, n: usize) {
        debug_assert!(self.len + n <= self.capacity());
        self.len += n;
    }

    /// Moves staged bytes into the front of `dest`, returning how many.
    ///
    /// Releases the buffer if this empties the live region.
    pub(crate) fn drain_into(&mut self, dest: &mut [u8]) -> usize {
        let live = self.live();
        let n = live.len().min(dest.len());
        dest[..n].copy_from_slice(&live[..n]);
        self.consumed += n;
        self.settle();
        n
    }

    /// Releases the buffer if it holds no live bytes.
    pub(crate) fn settle(&mut self) {
        if self.consumed == self.len {
            self.release();
        }
    }

    /// Returns the buffer to the pool and resets both counters.
    ///
    /// Live bytes, if any, are discarded.
    pub(crate) fn release(&mut self) {
        if let Some(buf) = self.buf.take() {
            #[cfg(feature = "tracing")]
            tracing::trace!(capacity = buf.len(), "releasing staging buffer");
            self.pool.release(buf);
        }
        self.len = 0;
        self.consumed = 0;
    }
}

impl<P: BufferPool> Drop for StagingBuffer<P> {
    fn drop(&mut self) {
        self.release();
    }
}

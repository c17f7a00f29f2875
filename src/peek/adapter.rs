//! Core peek-ahead adapter - PeekableAdapter.
//!
//! The adapter tracks three cursors with one staging buffer:
//!
//! - what the source has produced (`pulled`)
//! - what is staged for lookahead (live region of the staging buffer)
//! - what the consumer has read (apparent position)
//!
//! Peeks append to the staging buffer. Reads drain it first and then pass
//! straight through to the source, so nothing gets staged unless someone
//! asked to look ahead.
//!
//! # Example
//!
//! ```
//! use std::io::Read;
//! use peekrs::{Ownership, PeekableAdapter};
//!
//! let data: Vec<u8> = (0..100).collect();
//! let mut adapter = PeekableAdapter::new(&data[..], Ownership::Owned)?;
//!
//! let mut head = [0u8; 10];
//! adapter.peek(&mut head)?;
//! assert_eq!(adapter.position(), 0);
//!
//! let mut buf = [0u8; 20];
//! assert_eq!(adapter.read(&mut buf)?, 20);
//! assert_eq!(&buf[..10], &head);
//! assert_eq!(adapter.position(), 20);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt;
use std::io::{self, Read};

use crate::buffer::{BufferPool, StagingBuffer, ThreadLocalPool};
use crate::config::PeekConfig;
use crate::error::PeekError;
use crate::peek::Peek;
use crate::source::Source;

/// Whether the adapter is responsible for closing its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ownership {
    /// [`PeekableAdapter::dispose`] closes the source.
    Owned,
    /// The source stays open; the caller closes it.
    Borrowed,
}

/// A forward-only reader with lookahead over a [`Source`].
///
/// Peeked bytes are staged in a buffer rented from `P` and handed back as
/// soon as every staged byte has been read. The adapter is read-only:
/// there is no seeking, writing or repositioning.
///
/// One adapter must not be used from several threads at once; `&mut self`
/// receivers enforce that.
pub struct PeekableAdapter<S: Source, P: BufferPool = ThreadLocalPool> {
    source: S,
    staging: StagingBuffer<P>,
    /// Total bytes obtained from the source, staged or not.
    pulled: u64,
    ownership: Ownership,
    disposed: bool,
}

impl<S: Source> PeekableAdapter<S> {
    /// Wraps `source` using the thread-local pool and default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PeekError::InvalidArgument`] if the source is not readable.
    pub fn new(source: S, ownership: Ownership) -> Result<Self, PeekError> {
        Self::with_config(source, ownership, PeekConfig::default())
    }

    /// Wraps `source` using the thread-local pool.
    ///
    /// # Errors
    ///
    /// Returns [`PeekError::InvalidArgument`] if the source is not readable
    /// and [`PeekError::InvalidConfig`] if `config` does not validate.
    pub fn with_config(
        source: S,
        ownership: Ownership,
        config: PeekConfig,
    ) -> Result<Self, PeekError> {
        Self::with_pool(source, ownership, ThreadLocalPool::new(), config)
    }
}

impl<S: Source, P: BufferPool> PeekableAdapter<S, P> {
    /// Wraps `source`, renting staging buffers from `pool`.
    ///
    /// # Example
    ///
    /// ```
    /// use peekrs::{Ownership, PeekConfig, PeekableAdapter, SharedPool};
    ///
    /// let pool = SharedPool::new();
    /// let adapter = PeekableAdapter::with_pool(
    ///     &b"abc"[..],
    ///     Ownership::Borrowed,
    ///     pool.clone(),
    ///     PeekConfig::default(),
    /// )?;
    /// assert_eq!(adapter.position(), 0);
    /// # Ok::<(), peekrs::PeekError>(())
    /// ```
    pub fn with_pool(
        source: S,
        ownership: Ownership,
        pool: P,
        config: PeekConfig,
    ) -> Result<Self, PeekError> {
        if !source.is_readable() {
            return Err(PeekError::InvalidArgument {
                message: "source does not support reading",
            });
        }
        config.validate()?;

        Ok(Self {
            source,
            staging: StagingBuffer::new(pool, config.min_grow()),
            pulled: 0,
            ownership,
            disposed: false,
        })
    }

    fn check_live(&self) -> io::Result<()> {
        if self.disposed {
            return Err(PeekError::Disposed.into());
        }
        Ok(())
    }

    /// Looks at up to `buf.len()` upcoming bytes without consuming them.
    ///
    /// Issues at most one read on the source, straight into the tail of the
    /// staging buffer. Source errors are returned unchanged.
    pub fn peek(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.check_live()?;
        if buf.is_empty() {
            return Ok(0);
        }

        let spare = self.staging.reserve(buf.len());
        let n = match self.source.read(spare) {
            Ok(n) => n,
            Err(e) => {
                self.staging.settle();
                return Err(e);
            }
        };
        buf[..n].copy_from_slice(&spare[..n]);

        self.staging.commit(n);
        self.staging.settle();
        self.pulled += n as u64;
        Ok(n)
    }

    /// Looks at the next upcoming byte. `None` marks the end of data.
    pub fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        self.check_live()?;

        let spare = self.staging.reserve(1);
        let n = match self.source.read(spare) {
            Ok(n) => n,
            Err(e) => {
                self.staging.settle();
                return Err(e);
            }
        };
        let byte = spare[0];

        self.staging.commit(n);
        self.staging.settle();
        self.pulled += n as u64;
        Ok((n == 1).then_some(byte))
    }

    /// Reads a single byte. `None` marks the end of data.
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        let n = self.read(&mut byte)?;
        Ok((n == 1).then_some(byte[0]))
    }

    /// Number of bytes delivered by `read` so far.
    ///
    /// Lags behind the source's own cursor by [`staged_len`] bytes.
    ///
    /// [`staged_len`]: PeekableAdapter::staged_len
    pub fn position(&self) -> u64 {
        self.pulled - self.staging.live_len() as u64
    }

    /// Peeked bytes that have not been read yet.
    pub fn staged(&self) -> &[u8] {
        self.staging.live()
    }

    /// Number of peeked bytes that have not been read yet.
    pub fn staged_len(&self) -> usize {
        self.staging.live_len()
    }

    /// Whether a staging buffer is currently rented.
    pub fn holds_buffer(&self) -> bool {
        self.staging.is_allocated()
    }

    /// Capacity of the rented staging buffer, 0 if none is held.
    pub fn staging_capacity(&self) -> usize {
        self.staging.capacity()
    }

    /// Total length of the source.
    ///
    /// # Errors
    ///
    /// Returns [`PeekError::Unsupported`] if the source does not know it.
    pub fn length(&self) -> Result<u64, PeekError> {
        self.source
            .known_len()
            .ok_or(PeekError::Unsupported {
                operation: "length",
            })
    }

    /// Flushes the source.
    pub fn flush(&mut self) -> io::Result<()> {
        self.check_live()?;
        self.source.flush()
    }

    /// Returns the staging buffer to the pool and, if owned, closes the
    /// source.
    ///
    /// Staged bytes are discarded. Calling this more than once is a no-op.
    /// Peeks and reads afterwards fail with [`PeekError::Disposed`].
    pub fn dispose(&mut self) -> io::Result<()> {
        if self.disposed {
            return Ok(());
        }
        self.disposed = true;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            position = self.position(),
            discarded = self.staging.live_len(),
            owned = self.ownership == Ownership::Owned,
            "disposing peekable adapter"
        );

        self.staging.release();
        match self.ownership {
            Ownership::Owned => self.source.close(),
            Ownership::Borrowed => Ok(()),
        }
    }

    /// Whether [`dispose`](PeekableAdapter::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Ownership chosen at construction.
    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    /// Gets a reference to the source.
    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Gets a mutable reference to the source.
    ///
    /// Reading from it directly skips the staged bytes and desynchronizes
    /// [`position`](PeekableAdapter::position).
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Gets a reference to the pool.
    pub fn pool(&self) -> &P {
        self.staging.pool()
    }
}

impl<S: Source, P: BufferPool> Read for PeekableAdapter<S, P> {
    /// Drains staged bytes first, then reads the remainder directly from
    /// the source without staging it.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.check_live()?;

        let drained = self.staging.drain_into(buf);
        let rest = &mut buf[drained..];
        if rest.is_empty() {
            return Ok(drained);
        }

        let n = match self.source.read(rest) {
            Ok(n) => n,
            // Staged bytes already left the buffer; report them and let a
            // lasting source error surface on the next call.
            Err(_) if drained > 0 => return Ok(drained),
            Err(e) => return Err(e),
        };
        self.pulled += n as u64;
        Ok(drained + n)
    }
}

impl<S: Source, P: BufferPool> Peek for PeekableAdapter<S, P> {
    fn peek(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        PeekableAdapter::peek(self, buf)
    }

    fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        PeekableAdapter::peek_byte(self)
    }

    fn position(&self) -> u64 {
        PeekableAdapter::position(self)
    }
}

impl<S: Source, P: BufferPool> Drop for PeekableAdapter<S, P> {
    fn drop(&mut self) {
        let _ = self.dispose();
    }
}

impl<S: Source + fmt::Debug, P: BufferPool> fmt::Debug for PeekableAdapter<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeekableAdapter")
            .field("source", &self.source)
            .field("position", &self.position())
            .field("staged", &self.staged_len())
            .field("capacity", &self.staging_capacity())
            .field("ownership", &self.ownership)
            .field("disposed", &self.disposed)
            .finish()
    }
}

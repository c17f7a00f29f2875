//! Async peek-ahead adapter.
//!
//! [`AsyncPeekable`] is the `futures-io` counterpart of
//! [`PeekableAdapter`](crate::PeekableAdapter). It stages lookahead in the
//! same pooled buffer, so the growth and release rules are identical.
//!
//! # Example
//!
//! ```ignore
//! use futures_util::io::AsyncReadExt;
//! use peekrs::peekable_async;
//!
//! async fn demo<R: futures_io::AsyncRead + Unpin>(reader: R) -> std::io::Result<()> {
//!     let mut reader = peekable_async(reader);
//!
//!     let mut magic = [0u8; 4];
//!     let n = reader.peek(&mut magic).await?;
//!     println!("starts with {:?}", &magic[..n]);
//!
//!     let mut all = Vec::new();
//!     reader.read_to_end(&mut all).await?;
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::ready;
use futures_io::AsyncRead;
use pin_project_lite::pin_project;

use crate::buffer::{BufferPool, StagingBuffer, ThreadLocalPool};
use crate::config::PeekConfig;
use crate::error::PeekError;

pin_project! {
    /// An async reader with lookahead.
    ///
    /// Uses `futures_io::AsyncRead`, so it works with any runtime. Tokio
    /// readers can be bridged with `tokio_util::compat`.
    pub struct AsyncPeekable<R, P: BufferPool> {
        #[pin]
        reader: R,
        staging: StagingBuffer<P>,
        pulled: u64,
    }
}

impl<R: AsyncRead> AsyncPeekable<R, ThreadLocalPool> {
    /// Wraps `reader` using the thread-local pool and default configuration.
    ///
    /// Async tasks may migrate between threads; buffers then simply end up
    /// pooled on whichever thread released them.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            staging: StagingBuffer::new(ThreadLocalPool::new(), PeekConfig::default().min_grow()),
            pulled: 0,
        }
    }
}

impl<R: AsyncRead, P: BufferPool> AsyncPeekable<R, P> {
    /// Wraps `reader`, renting staging buffers from `pool`.
    ///
    /// # Errors
    ///
    /// Returns [`PeekError::InvalidConfig`] if `config` does not validate.
    pub fn with_pool(reader: R, pool: P, config: PeekConfig) -> Result<Self, PeekError> {
        config.validate()?;
        Ok(Self {
            reader,
            staging: StagingBuffer::new(pool, config.min_grow()),
            pulled: 0,
        })
    }

    /// Attempts to look at up to `buf.len()` upcoming bytes without
    /// consuming them.
    ///
    /// Polls the reader at most once, straight into the staging buffer.
    /// While the reader is pending the rented buffer is kept, so re-polls
    /// reuse it instead of renting again.
    pub fn poll_peek(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.project();
        if buf.is_empty() {
            return Poll::Ready(Ok(0));
        }

        let spare = this.staging.reserve(buf.len());
        let n = match this.reader.poll_read(cx, spare) {
            Poll::Ready(Ok(n)) => n,
            Poll::Ready(Err(e)) => {
                this.staging.settle();
                return Poll::Ready(Err(e));
            }
            Poll::Pending => return Poll::Pending,
        };
        buf[..n].copy_from_slice(&spare[..n]);

        this.staging.commit(n);
        this.staging.settle();
        *this.pulled += n as u64;
        Poll::Ready(Ok(n))
    }

    /// Attempts to look at the next upcoming byte. `None` marks the end of
    /// data.
    pub fn poll_peek_byte(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<io::Result<Option<u8>>> {
        let mut byte = [0u8; 1];
        let n = ready!(self.poll_peek(cx, &mut byte))?;
        Poll::Ready(Ok((n == 1).then_some(byte[0])))
    }

    /// Number of bytes delivered by reads so far.
    pub fn position(&self) -> u64 {
        self.pulled - self.staging.live_len() as u64
    }

    /// Peeked bytes that have not been read yet.
    pub fn staged(&self) -> &[u8] {
        self.staging.live()
    }

    /// Whether a staging buffer is currently rented.
    pub fn holds_buffer(&self) -> bool {
        self.staging.is_allocated()
    }

    /// Gets a reference to the reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Gets a pinned mutable reference to the reader.
    ///
    /// Reading from it directly skips the staged bytes.
    pub fn get_pin_mut(self: Pin<&mut Self>) -> Pin<&mut R> {
        self.project().reader
    }

    /// Returns the reader. Staged bytes are discarded.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: AsyncRead + Unpin, P: BufferPool> AsyncPeekable<R, P> {
    /// Looks at up to `buf.len()` upcoming bytes without consuming them.
    pub fn peek<'a>(&'a mut self, buf: &'a mut [u8]) -> PeekFuture<'a, R, P> {
        PeekFuture { peekable: self, buf }
    }

    /// Looks at the next upcoming byte. `None` marks the end of data.
    pub fn peek_byte(&mut self) -> PeekByteFuture<'_, R, P> {
        PeekByteFuture { peekable: self }
    }
}

impl<R: AsyncRead, P: BufferPool> AsyncRead for AsyncPeekable<R, P> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.project();

        let drained = this.staging.drain_into(buf);
        let rest = &mut buf[drained..];
        if rest.is_empty() {
            return Poll::Ready(Ok(drained));
        }

        match this.reader.poll_read(cx, rest) {
            Poll::Ready(Ok(n)) => {
                *this.pulled += n as u64;
                Poll::Ready(Ok(drained + n))
            }
            // Staged bytes are already in `buf`; hand them over now.
            Poll::Ready(Err(_)) | Poll::Pending if drained > 0 => Poll::Ready(Ok(drained)),
            Poll::Ready(Err(e)) => Poll::Ready(Err(e)),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Future returned by [`AsyncPeekable::peek`].
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct PeekFuture<'a, R, P: BufferPool> {
    peekable: &'a mut AsyncPeekable<R, P>,
    buf: &'a mut [u8],
}

impl<R: AsyncRead + Unpin, P: BufferPool> Future for PeekFuture<'_, R, P> {
    type Output = io::Result<usize>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        Pin::new(&mut *this.peekable).poll_peek(cx, this.buf)
    }
}

/// Future returned by [`AsyncPeekable::peek_byte`].
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct PeekByteFuture<'a, R, P: BufferPool> {
    peekable: &'a mut AsyncPeekable<R, P>,
}

impl<R: AsyncRead + Unpin, P: BufferPool> Future for PeekByteFuture<'_, R, P> {
    type Output = io::Result<Option<u8>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut *self.peekable).poll_peek_byte(cx)
    }
}

/// Creates a peekable async reader.
///
/// Uses `futures_io::AsyncRead` for runtime-agnostic async I/O.
///
/// # Runtime Compatibility
///
/// For tokio users, `tokio_util::compat` converts `tokio::io::AsyncRead` to
/// `futures_io::AsyncRead`:
///
/// ```ignore
/// use tokio_util::compat::TokioAsyncReadCompatExt;
/// use peekrs::peekable_async;
///
/// let file = tokio::fs::File::open("file").await?;
/// let mut reader = peekable_async(file.compat());
/// ```
pub fn peekable_async<R: AsyncRead>(reader: R) -> AsyncPeekable<R, ThreadLocalPool> {
    AsyncPeekable::new(reader)
}

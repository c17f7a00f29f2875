//! The byte producers an adapter can wrap.
//!
//! [`Source`] is [`std::io::Read`] plus the few capabilities the adapter
//! passes through. Common readers implement it directly; anything else can
//! be wrapped in [`ReadSource`].

use std::fs::File;
use std::io::{self, Cursor, Empty, Read, Stdin};
use std::net::{Shutdown, TcpStream};

/// A forward-only byte producer.
///
/// `read` returning `Ok(0)` means end of data. Reads block until at least
/// one byte is available or the source is exhausted.
pub trait Source: Read {
    /// Whether the source can be read at all.
    ///
    /// Adapters refuse to wrap a source that answers `false`.
    fn is_readable(&self) -> bool {
        true
    }

    /// Total length in bytes, when the source knows it.
    ///
    /// This is the length of the whole underlying data, so it must not
    /// shrink as the source is read.
    fn known_len(&self) -> Option<u64> {
        None
    }

    /// Flushes any state the source keeps. Read-only sources do nothing.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Releases the underlying resource.
    ///
    /// Adapters only call this on sources they own.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A slice only knows what remains of it, so its length is unknown. Wrap it
/// in a [`Cursor`] to report the total.
impl Source for &[u8] {}

impl<T: AsRef<[u8]>> Source for Cursor<T> {
    fn known_len(&self) -> Option<u64> {
        Some(self.get_ref().as_ref().len() as u64)
    }
}

impl Source for Empty {
    fn known_len(&self) -> Option<u64> {
        Some(0)
    }
}

impl Source for Stdin {}

impl Source for File {
    fn known_len(&self) -> Option<u64> {
        self.metadata().ok().map(|m| m.len())
    }
}

impl Source for TcpStream {
    fn close(&mut self) -> io::Result<()> {
        match self.shutdown(Shutdown::Both) {
            Err(e) if e.kind() != io::ErrorKind::NotConnected => Err(e),
            _ => Ok(()),
        }
    }
}

impl<S: Source + ?Sized> Source for &mut S {
    fn is_readable(&self) -> bool {
        (**self).is_readable()
    }

    fn known_len(&self) -> Option<u64> {
        (**self).known_len()
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn is_readable(&self) -> bool {
        (**self).is_readable()
    }

    fn known_len(&self) -> Option<u64> {
        (**self).known_len()
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Wraps any [`Read`] as a [`Source`] of unknown length.
///
/// # Example
///
/// ```
/// use std::io::Read;
/// use peekrs::{Ownership, PeekableAdapter, ReadSource};
///
/// let chained = (&b"ab"[..]).chain(&b"cd"[..]);
/// let mut adapter = PeekableAdapter::new(ReadSource::new(chained), Ownership::Owned)?;
/// assert!(adapter.length().is_err());
///
/// let mut all = Vec::new();
/// adapter.read_to_end(&mut all)?;
/// assert_eq!(all, b"abcd");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default)]
pub struct ReadSource<R> {
    inner: R,
}

impl<R: Read> ReadSource<R> {
    /// Wraps a reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Gets a reference to the wrapped reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }
}

impl<R: Read> Read for ReadSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read> Source for ReadSource<R> {}

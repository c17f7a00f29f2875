//! Peek-ahead reading.
//!
//! - [`Peek`] - The capability format sniffers and decoders program against
//! - [`PeekableAdapter`] - Wraps a [`Source`](crate::Source) with pooled lookahead

mod adapter;

use std::io::{self, Read};

pub use adapter::{Ownership, PeekableAdapter};

/// A reader that can look ahead without consuming.
///
/// Every `peek` continues where the previous one stopped, so repeated peeks
/// walk forward through the upcoming bytes. A later `read` returns those same
/// bytes again, in order, before anything new.
pub trait Peek: Read {
    /// Looks at up to `buf.len()` upcoming bytes without consuming them.
    ///
    /// Returns fewer bytes near the end of data and `Ok(0)` once exhausted.
    fn peek(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Looks at the next upcoming byte. `None` marks the end of data.
    fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        let n = self.peek(&mut byte)?;
        Ok((n == 1).then_some(byte[0]))
    }

    /// Peeks until `buf` is full.
    ///
    /// Retries [`io::ErrorKind::Interrupted`] like [`Read::read_exact`].
    /// Fails with [`io::ErrorKind::UnexpectedEof`] if the data runs out
    /// first. Bytes peeked before that stay staged and will still be read.
    fn peek_exact(&mut self, mut buf: &mut [u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.peek(buf) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "failed to fill whole peek buffer",
                    ));
                }
                Ok(n) => buf = &mut buf[n..],
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Bytes delivered to the consumer so far.
    fn position(&self) -> u64;
}

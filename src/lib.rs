//! peekrs
//!
//! Peek-ahead reading for forward-only byte streams.
//!
//! `peekrs` lets a consumer look at upcoming bytes of a non-seekable source
//! without consuming them, and then read those same bytes normally. It is a
//! small primitive for:
//!
//! - format sniffing (magic numbers, BOMs, protocol preambles)
//! - decoders that pick a code path from the first few bytes
//! - parsers that need bounded lookahead over sockets or pipes
//!
//! The crate intentionally:
//! - does NOT seek, write or truncate
//! - does NOT interpret bytes
//! - does NOT manage concurrency
//!
//! Lookahead lives in a buffer rented from a [`BufferPool`] only while it
//! holds unread bytes. Reads drain it first and then pass straight through.
//!
//! # Sync
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::Read;
//! use peekrs::{Ownership, PeekableAdapter};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let file = File::open("data.bin")?;
//!     let mut reader = PeekableAdapter::new(file, Ownership::Owned)?;
//!
//!     let mut magic = [0u8; 4];
//!     let n = reader.peek(&mut magic)?;
//!     println!("magic {:02x?}", &magic[..n]);
//!
//!     // The magic bytes are still there
//!     let mut all = Vec::new();
//!     reader.read_to_end(&mut all)?;
//!     Ok(())
//! }
//! ```
//!
//! # Async (feature = "async-io")
//!
//! ```ignore
//! use futures_util::io::AsyncReadExt;
//! use peekrs::peekable_async;
//!
//! async fn demo<R: futures_io::AsyncRead + Unpin>(reader: R) -> std::io::Result<()> {
//!     let mut reader = peekable_async(reader);
//!
//!     if reader.peek_byte().await? == Some(b'{') {
//!         println!("looks like json");
//!     }
//!     let mut all = Vec::new();
//!     reader.read_to_end(&mut all).await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod peek;
mod source;

mod buffer; // pools and the staging buffer

#[cfg(feature = "async-io")]
mod async_stream;

//
// Public surface
//

pub use buffer::{BufferPool, HeapPool, SharedPool, ThreadLocalPool};
pub use config::{
    DEFAULT_MAX_BUFFER_SIZE, DEFAULT_MAX_POOLED, DEFAULT_MIN_GROW, PeekConfig, PoolConfig,
};
pub use error::PeekError;
pub use peek::{Ownership, Peek, PeekableAdapter};
pub use source::{ReadSource, Source};

#[cfg(feature = "async-io")]
pub use async_stream::{AsyncPeekable, PeekByteFuture, PeekFuture, peekable_async};

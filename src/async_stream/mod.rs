//! Async peeking support.
//!
//! This module provides asynchronous lookahead using the `futures-io::AsyncRead`
//! trait, making it runtime-agnostic and compatible with tokio, async-std,
//! smol, and other async runtimes.
//!
//! - [`peekable_async`] - Wraps an async reader with lookahead
//!
//! This module requires the `async-io` feature to be enabled.

mod peekable;

pub use peekable::{AsyncPeekable, PeekByteFuture, PeekFuture, peekable_async};

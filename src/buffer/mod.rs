//! Buffer management for staged lookahead bytes.
//!
//! - [`BufferPool`] and its implementations supply reusable buffers.
//! - `StagingBuffer` owns at most one rented buffer and is the only place
//!   that gives it back. It is an implementation detail.

mod pool;
mod staging;

pub use pool::{BufferPool, HeapPool, SharedPool, ThreadLocalPool};
pub(crate) use staging::StagingBuffer;

#[cfg(test)]
pub(crate) use pool::CountingPool;

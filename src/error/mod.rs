//! Error types for peekrs.
//!
//! Source failures during `peek`/`read` are never wrapped: those methods
//! return the source's own [`std::io::Error`]. [`PeekError`] covers what the
//! adapter itself can reject.

use std::fmt;
use std::io;

/// Errors raised by the adapter itself.
#[derive(Debug)]
pub enum PeekError {
    /// An I/O error occurred outside of a plain read or peek.
    Io(io::Error),

    /// An argument was rejected at construction time.
    InvalidArgument {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// The operation cannot be performed by a forward-only adapter.
    ///
    /// This is structural: it fails the same way regardless of state.
    Unsupported {
        /// Name of the rejected operation.
        operation: &'static str,
    },

    /// Invalid configuration parameter.
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// The adapter was used after [`dispose`](crate::PeekableAdapter::dispose).
    Disposed,
}

impl fmt::Display for PeekError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeekError::Io(e) => write!(f, "io error: {}", e),
            PeekError::InvalidArgument { message } => {
                write!(f, "invalid argument: {}", message)
            }
            PeekError::Unsupported { operation } => {
                write!(f, "unsupported operation: {}", operation)
            }
            PeekError::InvalidConfig { message } => {
                write!(f, "invalid config: {}", message)
            }
            PeekError::Disposed => f.write_str("adapter has been disposed"),
        }
    }
}

impl std::error::Error for PeekError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PeekError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for PeekError {
    fn from(e: io::Error) -> Self {
        PeekError::Io(e)
    }
}

impl From<PeekError> for io::Error {
    fn from(e: PeekError) -> Self {
        match e {
            PeekError::Io(e) => e,
            PeekError::InvalidArgument { .. } | PeekError::InvalidConfig { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, e)
            }
            PeekError::Unsupported { .. } => io::Error::new(io::ErrorKind::Unsupported, e),
            PeekError::Disposed => io::Error::other(e),
        }
    }
}

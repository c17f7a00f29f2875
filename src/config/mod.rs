//! Configuration for peeking and buffer pooling.
//!
//! - [`PeekConfig`] - Staging buffer growth
//! - [`PoolConfig`] - Buffer retention for the built-in pools
//!
//! # Example
//!
//! ```
//! use peekrs::{PeekConfig, PoolConfig};
//!
//! // Larger minimum growth step for peek-heavy parsers
//! let config = PeekConfig::new(256)?;
//!
//! // Keep more buffers around per pool
//! let pool = PoolConfig::default().with_max_pooled(16);
//! assert!(pool.validate().is_ok());
//!
//! # Ok::<(), peekrs::PeekError>(())
//! ```

use crate::error::PeekError;

/// Default minimum size of a freshly rented staging buffer.
///
/// Keeps single-byte peeks from renting a new buffer on every growth step.
pub const DEFAULT_MIN_GROW: usize = 10;

/// Default maximum number of buffers retained by a pool.
pub const DEFAULT_MAX_POOLED: usize = 4;

/// Default largest buffer (128 KiB) a pool will retain on release.
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 128 * 1024;

/// Configuration for a [`PeekableAdapter`](crate::PeekableAdapter).
///
/// # Example
///
/// ```
/// use peekrs::PeekConfig;
///
/// let config = PeekConfig::default().with_min_grow(64);
/// assert_eq!(config.min_grow(), 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeekConfig {
    /// Lower bound for any staging buffer the adapter rents.
    min_grow: usize,
}

impl PeekConfig {
    /// Creates a new configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PeekError::InvalidConfig`] if `min_grow` is zero.
    pub fn new(min_grow: usize) -> Result<Self, PeekError> {
        if min_grow == 0 {
            return Err(PeekError::InvalidConfig {
                message: "min_grow must be non-zero",
            });
        }

        Ok(Self { min_grow })
    }

    /// Sets the minimum staging buffer size.
    ///
    /// Note: This does not validate the configuration. Use
    /// [`PeekConfig::validate`] to check it.
    pub fn with_min_grow(mut self, size: usize) -> Self {
        self.min_grow = size;
        self
    }

    /// Returns the minimum staging buffer size.
    pub fn min_grow(&self) -> usize {
        self.min_grow
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<(), PeekError> {
        Self::new(self.min_grow).map(|_| ())
    }
}

impl Default for PeekConfig {
    fn default() -> Self {
        Self {
            min_grow: DEFAULT_MIN_GROW,
        }
    }
}

/// Retention policy for [`ThreadLocalPool`](crate::ThreadLocalPool) and
/// [`SharedPool`](crate::SharedPool).
///
/// Buffers larger than `max_buffer_size` are freed instead of pooled, and at
/// most `max_pooled` buffers are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolConfig {
    max_pooled: usize,
    max_buffer_size: usize,
}

impl PoolConfig {
    /// Creates a new pool configuration.
    ///
    /// A `max_pooled` of zero is allowed and disables retention.
    ///
    /// # Errors
    ///
    /// Returns [`PeekError::InvalidConfig`] if `max_buffer_size` is zero.
    pub fn new(max_pooled: usize, max_buffer_size: usize) -> Result<Self, PeekError> {
        if max_buffer_size == 0 {
            return Err(PeekError::InvalidConfig {
                message: "max_buffer_size must be non-zero",
            });
        }

        Ok(Self {
            max_pooled,
            max_buffer_size,
        })
    }

    /// Sets the maximum number of retained buffers.
    pub fn with_max_pooled(mut self, count: usize) -> Self {
        self.max_pooled = count;
        self
    }

    /// Sets the largest buffer size that will be retained.
    pub fn with_max_buffer_size(mut self, size: usize) -> Self {
        self.max_buffer_size = size;
        self
    }

    /// Returns the maximum number of retained buffers.
    pub fn max_pooled(&self) -> usize {
        self.max_pooled
    }

    /// Returns the largest buffer size that will be retained.
    pub fn max_buffer_size(&self) -> usize {
        self.max_buffer_size
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<(), PeekError> {
        Self::new(self.max_pooled, self.max_buffer_size).map(|_| ())
    }

    /// Whether a released buffer of `capacity` bytes may join a pool that
    /// already holds `pooled` buffers.
    pub(crate) fn retains(&self, capacity: usize, pooled: usize) -> bool {
        capacity <= self.max_buffer_size && pooled < self.max_pooled
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_pooled: DEFAULT_MAX_POOLED,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_config_default() {
        assert_eq!(PeekConfig::default().min_grow(), DEFAULT_MIN_GROW);
    }

    #[test]
    fn test_peek_config_builder() {
        let config = PeekConfig::default().with_min_grow(4096);
        assert_eq!(config.min_grow(), 4096);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_peek_config_invalid_zero() {
        assert!(PeekConfig::new(0).is_err());
        assert!(PeekConfig::default().with_min_grow(0).validate().is_err());
    }

    #[test]
    fn test_pool_config_default() {
        let config = PoolConfig::default();
        assert_eq!(config.max_pooled(), DEFAULT_MAX_POOLED);
        assert_eq!(config.max_buffer_size(), DEFAULT_MAX_BUFFER_SIZE);
    }

    #[test]
    fn test_pool_config_invalid_size() {
        assert!(PoolConfig::new(4, 0).is_err());
        assert!(PoolConfig::new(0, 1024).is_ok());
    }

    #[test]
    fn test_pool_config_retains() {
        let config = PoolConfig::new(2, 1024).unwrap();
        assert!(config.retains(1024, 0));
        assert!(config.retains(16, 1));
        assert!(!config.retains(1025, 0));
        assert!(!config.retains(16, 2));
    }
}

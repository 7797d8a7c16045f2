//! Construction options for buffered streams.

use oxistream_core::error::{Result, StreamError};
use oxistream_core::lifecycle::Ownership;

/// Default cache capacity (4 KB).
pub const DEFAULT_BUFFER_SIZE: usize = 4 * 1024;

/// Options fixed when a buffered stream is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BufferOptions {
    /// Cache capacity in bytes. Must be non-zero.
    pub capacity: usize,
    /// Whether disposing the buffered stream disposes the wrapped stream.
    pub ownership: Ownership,
}

impl Default for BufferOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_BUFFER_SIZE,
            ownership: Ownership::Owned,
        }
    }
}

impl BufferOptions {
    /// Default options: 4 KB cache, wrapped stream owned.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the ownership of the wrapped stream.
    pub fn with_ownership(mut self, ownership: Ownership) -> Self {
        self.ownership = ownership;
        self
    }

    /// Leave the wrapped stream open when the buffered stream is disposed.
    pub fn leave_open(self) -> Self {
        self.with_ownership(Ownership::Borrowed)
    }

    /// Check the options.
    ///
    /// # Errors
    ///
    /// Fails with [`StreamError::InvalidArgument`] for a zero capacity.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(StreamError::invalid_argument(
                "buffer capacity must be greater than 0",
            ));
        }
        Ok(())
    }
}

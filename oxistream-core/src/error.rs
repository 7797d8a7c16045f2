//! Error types for OxiStream operations.
//!
//! Every layer of the stack (providers, buffered streams, bit adapters)
//! reports failures through [`StreamError`]. Ordinary end of data is *not* an
//! error: the basic read primitives return a short count or `None`. Only the
//! `*_exact` variants, which need a definite amount of data, fail with
//! [`StreamError::UnexpectedEof`].

use std::io;
use thiserror::Error;

/// The main error type for OxiStream operations.
#[derive(Debug, Error)]
pub enum StreamError {
    /// I/O error from the underlying provider.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Operation invoked on a stream that has already been disposed.
    #[error("Cannot access a disposed stream: {object}")]
    Disposed {
        /// Type name of the disposed stream.
        object: &'static str,
    },

    /// Operation not supported by this kind of stream.
    #[error("Unsupported operation: {operation}")]
    Unsupported {
        /// The rejected operation.
        operation: String,
    },

    /// Position or offset arithmetic left the representable range.
    #[error("Arithmetic overflow in {operation}")]
    Overflow {
        /// The operation whose arithmetic overflowed.
        operation: String,
    },

    /// The stream ended before a definite amount of data was available.
    #[error("Unexpected end of stream: expected {expected} more units")]
    UnexpectedEof {
        /// Number of bytes (or bits, for bit streams) still missing.
        expected: u64,
    },

    /// An argument was rejected.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected argument.
        message: String,
    },

    /// The operation observed a cancellation request.
    #[error("Operation cancelled")]
    Cancelled,
}

/// Result type alias for OxiStream operations.
pub type Result<T> = std::result::Result<T, StreamError>;

impl StreamError {
    /// Create a disposed-access error.
    pub fn disposed(object: &'static str) -> Self {
        Self::Disposed { object }
    }

    /// Create an unsupported operation error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Create an arithmetic overflow error.
    pub fn overflow(operation: impl Into<String>) -> Self {
        Self::Overflow {
            operation: operation.into(),
        }
    }

    /// Create an unexpected end-of-stream error.
    pub fn unexpected_eof(expected: u64) -> Self {
        Self::UnexpectedEof { expected }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create the error reported when a provider accepts zero bytes.
    pub fn write_zero() -> Self {
        Self::Io(io::Error::new(
            io::ErrorKind::WriteZero,
            "underlying stream accepted zero bytes",
        ))
    }

    /// Check whether this is a disposed-access error.
    pub fn is_disposed(&self) -> bool {
        matches!(self, Self::Disposed { .. })
    }

    /// Check whether this is a premature end-of-stream error.
    pub fn is_unexpected_eof(&self) -> bool {
        matches!(self, Self::UnexpectedEof { .. })
    }
}

impl From<StreamError> for io::Error {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Io(e) => e,
            StreamError::Disposed { .. } => io::Error::other(err),
            StreamError::Unsupported { .. } => io::Error::new(io::ErrorKind::Unsupported, err),
            StreamError::Overflow { .. } | StreamError::InvalidArgument { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, err)
            }
            StreamError::UnexpectedEof { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            StreamError::Cancelled => io::Error::new(io::ErrorKind::Interrupted, err),
        }
    }
}

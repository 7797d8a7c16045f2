//! # OxiStream Buffered
//!
//! Caching wrappers that batch many small reads or writes against an
//! expensive random-access stream into few large ones.
//!
//! - [`BufferedInput`]: read-ahead cache, invalidated on seek
//! - [`BufferedOutput`]: write-back cache, drained on flush, seek,
//!   `set_length`, dispose and drop
//! - [`BufferOptions`]: cache capacity and ownership of the wrapped stream
//!
//! With the `async-io` feature, [`AsyncBufferedInput`] and
//! [`AsyncBufferedOutput`] provide the same semantics over the suspending
//! stream traits.
//!
//! ## Example
//!
//! ```rust
//! use oxistream_buffered::{BufferedInput, BufferedOutput};
//! use oxistream_core::memory::MemoryStream;
//! use oxistream_core::traits::{SequentialRead, SequentialWrite};
//!
//! let mut out = BufferedOutput::with_capacity(MemoryStream::<u64>::new(), 4).unwrap();
//! out.write_all(b"0123456789").unwrap();
//! let stream = out.into_inner().unwrap();
//! // 10 bytes through a 4-byte cache: 4 + 4 + 2
//! assert_eq!(stream.stats().writes, 3);
//!
//! let mut input = BufferedInput::with_capacity(
//!     MemoryStream::<u64>::from_vec(stream.into_inner()).unwrap(),
//!     4,
//! )
//! .unwrap();
//! let mut back = [0u8; 10];
//! input.read_exact(&mut back).unwrap();
//! assert_eq!(&back, b"0123456789");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

#[cfg(feature = "async-io")]
pub mod async_io;
mod cache;
pub mod input;
pub mod options;
pub mod output;

#[cfg(feature = "async-io")]
pub use async_io::{AsyncBufferedInput, AsyncBufferedOutput};
pub use input::BufferedInput;
pub use options::{BufferOptions, DEFAULT_BUFFER_SIZE};
pub use output::BufferedOutput;

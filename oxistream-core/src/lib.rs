//! # OxiStream Core
//!
//! Core components for the OxiStream byte/bit streaming library.
//!
//! This crate provides the fundamental building blocks shared by every layer:
//!
//! - [`position`]: Generic position/offset arithmetic (u16 to u128)
//! - [`traits`]: Sequential and random-access stream traits
//! - [`lifecycle`]: Disposal state and ownership of wrapped streams
//! - [`cancel`]: Cooperative cancellation
//! - [`memory`], [`file`], [`io`]: Stream providers
//! - [`async_io`]: Suspending versions of the traits (feature `async-io`)
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! OxiStream is designed as a layered stack:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Bit packing                                         │
//! │     BitReader/BitWriter, MSB-first or LSB-first         │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Buffering                                           │
//! │     BufferedInput (read-ahead), BufferedOutput          │
//! │     (write-back)                                        │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Streams (this crate)                                │
//! │     Position traits, stream traits, providers           │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxistream_core::memory::MemoryStream;
//! use oxistream_core::traits::{RandomAccess, SequentialWrite};
//!
//! // A stream addressed with 32-bit positions
//! let mut stream: MemoryStream<u32> = MemoryStream::new();
//! stream.write_all(&[0xAB, 0xCD]).unwrap();
//! assert_eq!(stream.end_of_stream().unwrap(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

#[cfg(feature = "async-io")]
pub mod async_io;
pub mod cancel;
pub mod error;
pub mod file;
pub mod io;
pub mod lifecycle;
pub mod memory;
pub mod position;
pub mod traits;

// Re-exports for convenience
pub use cancel::CancellationToken;
pub use error::{Result, StreamError};
pub use file::FileStream;
pub use io::IoStream;
pub use lifecycle::{DisposeState, Disposable, Dispose, Ownership};
pub use memory::{MemoryStats, MemoryStream};
pub use position::{OffsetOf, StreamOffset, StreamPosition};
pub use traits::{
    Positioned, RandomAccess, RandomAccessRead, RandomAccessWrite, SequentialRead,
    SequentialWrite,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{Result, StreamError};
    pub use crate::lifecycle::{Disposable, Dispose, Ownership};
    pub use crate::memory::MemoryStream;
    pub use crate::position::{StreamOffset, StreamPosition};
    pub use crate::traits::{
        Positioned, RandomAccess, RandomAccessRead, RandomAccessWrite, SequentialRead,
        SequentialWrite,
    };
}

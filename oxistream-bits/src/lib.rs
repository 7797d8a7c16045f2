//! # OxiStream Bits
//!
//! Bit-level packing on top of OxiStream byte streams.
//!
//! - [`BitOrder`]: MSB-first or LSB-first packing within each byte
//! - [`Bits`]: an owned, ordered bit sequence
//! - [`BitReader`]: unpacks bits from a [`SequentialRead`] stream
//! - [`BitWriter`]: packs bits into a [`SequentialWrite`] stream
//!
//! With the `async-io` feature, [`AsyncBitReader`] and [`AsyncBitWriter`]
//! offer the same operations over the suspending stream traits.
//!
//! [`SequentialRead`]: oxistream_core::traits::SequentialRead
//! [`SequentialWrite`]: oxistream_core::traits::SequentialWrite
//!
//! ## Example
//!
//! ```rust
//! use oxistream_bits::{BitOrder, BitReader, BitWriter};
//! use oxistream_buffered::BufferedInput;
//! use oxistream_core::memory::MemoryStream;
//!
//! let mut writer = BitWriter::with_order(MemoryStream::<u64>::new(), BitOrder::LsbFirst);
//! writer.write_value(0b101, 3).unwrap();
//! writer.write_value(0x1F, 5).unwrap();
//! let bytes = writer.into_inner().unwrap().into_inner();
//!
//! let input = BufferedInput::new(MemoryStream::<u64>::from_vec(bytes).unwrap());
//! let mut reader = BitReader::with_order(input, BitOrder::LsbFirst);
//! assert_eq!(reader.read_value(3).unwrap(), Some(0b101));
//! assert_eq!(reader.read_value(5).unwrap(), Some(0x1F));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

#[cfg(feature = "async-io")]
pub mod async_io;
pub mod bits;
mod cursor;
pub mod order;
pub mod reader;
pub mod writer;

#[cfg(feature = "async-io")]
pub use async_io::{AsyncBitReader, AsyncBitWriter};
pub use bits::Bits;
pub use order::BitOrder;
pub use reader::BitReader;
pub use writer::BitWriter;

//! Bit-level writer over a sequential byte stream.
//!
//! Bits accumulate into a partial byte in the configured order. Each
//! completed byte is written to the underlying stream right away. Call
//! [`BitWriter::flush`] to pad and write a trailing partial byte.
//!
//! # Example
//!
//! ```
//! use oxistream_bits::{BitOrder, BitWriter, Bits};
//! use oxistream_core::memory::MemoryStream;
//!
//! let bits: Bits = "10110000".parse().unwrap();
//!
//! let mut msb = BitWriter::with_order(MemoryStream::<u64>::new(), BitOrder::MsbFirst);
//! msb.write_bits(&bits).unwrap();
//! assert_eq!(msb.into_inner().unwrap().as_slice(), &[0xB0]);
//!
//! let mut lsb = BitWriter::with_order(MemoryStream::<u64>::new(), BitOrder::LsbFirst);
//! lsb.write_bits(&bits).unwrap();
//! assert_eq!(lsb.into_inner().unwrap().as_slice(), &[0x0D]);
//! ```

use crate::bits::Bits;
use crate::cursor::WriteCursor;
use crate::order::BitOrder;
use oxistream_core::error::{Result, StreamError};
use oxistream_core::lifecycle::{DisposeState, Disposable, Dispose, Ownership};
use oxistream_core::traits::SequentialWrite;
use std::mem::ManuallyDrop;
use std::ptr;

/// A bit-level writer that wraps any [`SequentialWrite`] stream.
///
/// A writer that is dropped without being disposed makes a best-effort
/// flush; failures are logged, not reported.
#[derive(Debug)]
pub struct BitWriter<S: SequentialWrite> {
    /// Underlying stream.
    inner: S,
    cursor: WriteCursor,
    ownership: Ownership,
    state: DisposeState,
}

impl<S: SequentialWrite> BitWriter<S> {
    /// Create a MSB-first writer padding with `0` bits, owning `inner`.
    pub fn new(inner: S) -> Self {
        Self::with_order(inner, BitOrder::default())
    }

    /// Create a writer with the given bit order.
    pub fn with_order(inner: S, order: BitOrder) -> Self {
        Self {
            inner,
            cursor: WriteCursor::new(order, false),
            ownership: Ownership::Owned,
            state: DisposeState::Open,
        }
    }

    /// Pad partial bytes with `fill` instead of `0`.
    pub fn with_fill(mut self, fill: bool) -> Self {
        self.cursor.set_fill(fill);
        self
    }

    /// Leave the underlying stream open when this writer is disposed.
    pub fn leave_open(mut self) -> Self {
        self.ownership = Ownership::Borrowed;
        self
    }

    /// The bit order fixed at construction.
    pub fn order(&self) -> BitOrder {
        self.cursor.order()
    }

    /// The padding bit.
    pub fn fill(&self) -> bool {
        self.cursor.fill()
    }

    /// Get a reference to the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Total number of bits written so far, padding excluded.
    pub fn bits_written(&self) -> u64 {
        self.cursor.bits_written()
    }

    /// Number of bits waiting for their byte to complete.
    pub fn pending_bits(&self) -> u8 {
        self.cursor.pending_bits()
    }

    /// Flush and return the underlying stream without disposing it.
    pub fn into_inner(mut self) -> Result<S> {
        self.flush()?;
        // Use ManuallyDrop so Drop does not flush again
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so `inner` is moved out exactly once.
        Ok(unsafe { ptr::read(&this.inner) })
    }

    /// Write the completed byte, if any. The accumulator is only reset once
    /// the byte was accepted.
    fn emit(&mut self) -> Result<()> {
        if let Some(byte) = self.cursor.completed() {
            self.inner.write_all(&[byte])?;
            self.cursor.reset();
        }
        Ok(())
    }

    /// Write a single bit.
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.ensure_open()?;
        // A byte left over from a failed write goes first.
        self.emit()?;
        self.cursor.push(bit);
        self.emit()
    }

    /// Write every bit of `bits`, in order.
    pub fn write_bits(&mut self, bits: &Bits) -> Result<()> {
        self.ensure_open()?;
        for bit in bits {
            self.write_bit(bit)?;
        }
        Ok(())
    }

    /// Write the low `count` bits (at most 64) of `value`, most significant
    /// first.
    pub fn write_value(&mut self, value: u64, count: u8) -> Result<()> {
        self.ensure_open()?;
        if count > 64 {
            return Err(StreamError::invalid_argument(format!(
                "cannot write {} bits of a 64-bit value",
                count
            )));
        }
        for i in (0..count).rev() {
            self.write_bit((value >> i) & 1 == 1)?;
        }
        Ok(())
    }

    /// Pad a partial byte with the fill bit, write it, and flush the
    /// underlying stream.
    ///
    /// A second flush with no bits written in between writes nothing.
    pub fn flush(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.cursor.pending_bits() > 0 {
            log::trace!(
                "bit writer pads {} bits with {}",
                8 - self.cursor.pending_bits(),
                self.cursor.fill() as u8
            );
        }
        self.cursor.pad();
        self.emit()?;
        self.inner.flush()
    }
}

impl<S: SequentialWrite> Disposable for BitWriter<S> {
    fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }

    fn object_name(&self) -> &'static str {
        "BitWriter"
    }
}

impl<S: SequentialWrite + Dispose> Dispose for BitWriter<S> {
    /// Flush, then dispose the underlying stream if owned. A failed flush
    /// leaves the writer open.
    fn dispose(&mut self) -> Result<()> {
        if self.state.is_disposed() {
            return Ok(());
        }
        self.flush()?;
        self.state = DisposeState::Disposed;
        log::debug!("disposed bit writer after {} bits", self.bits_written());
        if self.ownership.disposes_inner() {
            self.inner.dispose()?;
        }
        Ok(())
    }
}

impl<S: SequentialWrite> Drop for BitWriter<S> {
    fn drop(&mut self) {
        if self.state.is_disposed() {
            return;
        }
        if let Err(e) = self.flush() {
            log::warn!("bit writer dropped with unflushed bits: {}", e);
        }
    }
}

//! Bit-level reader over a sequential byte stream.
//!
//! # End of stream
//!
//! End of stream is not an error for [`BitReader::read_bit`] and
//! [`BitReader::read_bits`]: they return `None`, and every later read
//! returns `None` too. A multi-bit read is all-or-nothing. If the stream ends
//! before `count` bits were assembled, the partial bits are discarded.
//!
//! Use [`BitReader::read_bits_exact`] when a definite amount of data is
//! expected; it reports premature end as [`StreamError::UnexpectedEof`].
//!
//! # Example
//!
//! ```
//! use oxistream_bits::{BitOrder, BitReader};
//! use oxistream_core::memory::MemoryStream;
//!
//! let stream = MemoryStream::<u32>::from_vec(vec![0xB0]).unwrap();
//! let mut reader = BitReader::with_order(stream, BitOrder::MsbFirst);
//!
//! assert_eq!(reader.read_bit().unwrap(), Some(true));
//! assert_eq!(reader.read_value(3).unwrap(), Some(0b011));
//! assert_eq!(reader.read_bits(8).unwrap(), None);
//! assert!(reader.is_finished());
//! ```

use crate::bits::Bits;
use crate::cursor::ReadCursor;
use crate::order::BitOrder;
use oxistream_core::cancel::CancellationToken;
use oxistream_core::error::{Result, StreamError};
use oxistream_core::lifecycle::{DisposeState, Disposable, Dispose, Ownership};
use oxistream_core::traits::SequentialRead;

/// A bit-level reader that wraps any [`SequentialRead`] stream.
///
/// Bytes are fetched one at a time, only when no buffered bit is left. Put a
/// buffered input stream underneath to amortize the fetches.
#[derive(Debug)]
pub struct BitReader<S: SequentialRead> {
    /// Underlying stream.
    inner: S,
    cursor: ReadCursor,
    cancel: Option<CancellationToken>,
    ownership: Ownership,
    state: DisposeState,
}

impl<S: SequentialRead> BitReader<S> {
    /// Create a MSB-first reader that owns `inner`.
    pub fn new(inner: S) -> Self {
        Self::with_order(inner, BitOrder::default())
    }

    /// Create a reader with the given bit order.
    pub fn with_order(inner: S, order: BitOrder) -> Self {
        Self {
            inner,
            cursor: ReadCursor::new(order),
            cancel: None,
            ownership: Ownership::Owned,
            state: DisposeState::Open,
        }
    }

    /// Check `token` before every byte fetched from the underlying stream.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Leave the underlying stream open when this reader is disposed.
    pub fn leave_open(mut self) -> Self {
        self.ownership = Ownership::Borrowed;
        self
    }

    /// The bit order fixed at construction.
    pub fn order(&self) -> BitOrder {
        self.cursor.order()
    }

    /// Get a reference to the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Consume this reader and return the underlying stream. Buffered bits
    /// are lost.
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Total number of bits handed out (or skipped) so far.
    pub fn bits_read(&self) -> u64 {
        self.cursor.bits_read()
    }

    /// Whether the end of the stream was reached and no bit is buffered.
    pub fn is_finished(&self) -> bool {
        self.cursor.is_finished()
    }

    /// Fetch the next byte into the cursor. `false` at the end of the stream.
    fn fetch(&mut self) -> Result<bool> {
        if self.cursor.at_end() {
            return Ok(false);
        }
        if let Some(token) = &self.cancel {
            token.check()?;
        }
        match self.inner.read_byte()? {
            Some(byte) => {
                log::trace!("bit reader fetched byte {:#04x}", byte);
                self.cursor.load(byte);
                Ok(true)
            }
            None => {
                log::trace!("bit reader reached end after {} bits", self.bits_read());
                self.cursor.mark_finished();
                Ok(false)
            }
        }
    }

    /// Read one bit. `None` once the underlying stream is exhausted.
    pub fn read_bit(&mut self) -> Result<Option<bool>> {
        self.ensure_open()?;
        if let Some(bit) = self.cursor.next_buffered() {
            return Ok(Some(bit));
        }
        if self.fetch()? {
            Ok(self.cursor.next_buffered())
        } else {
            Ok(None)
        }
    }

    /// Read `count` bits, or nothing.
    ///
    /// Bytes are fetched until `count` bits are buffered, and only then are
    /// the bits taken. On cancellation or an I/O failure nothing has been
    /// consumed, so a retry sees the same bits.
    pub fn read_bits(&mut self, count: usize) -> Result<Option<Bits>> {
        self.ensure_open()?;
        while self.cursor.buffered() < count {
            if !self.fetch()? {
                self.cursor.discard();
                return Ok(None);
            }
        }
        Ok(self.cursor.take(count))
    }

    /// Read exactly `count` bits.
    ///
    /// # Errors
    ///
    /// Fails with [`StreamError::UnexpectedEof`] if the stream ends first.
    pub fn read_bits_exact(&mut self, count: usize) -> Result<Bits> {
        self.read_bits(count)?
            .ok_or_else(|| StreamError::unexpected_eof(count as u64))
    }

    /// Read `count` bits (at most 64) as an unsigned number, first bit most
    /// significant.
    pub fn read_value(&mut self, count: u8) -> Result<Option<u64>> {
        self.ensure_open()?;
        if count > 64 {
            return Err(StreamError::invalid_argument(format!(
                "cannot read {} bits into a 64-bit value",
                count
            )));
        }
        Ok(self
            .read_bits(count as usize)?
            .and_then(|bits| bits.to_u64()))
    }

    /// Discard the rest of the current byte. Returns the number of bits
    /// skipped.
    pub fn align_to_byte(&mut self) -> Result<usize> {
        self.ensure_open()?;
        Ok(self.cursor.align())
    }
}

impl<S: SequentialRead> Disposable for BitReader<S> {
    fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }

    fn object_name(&self) -> &'static str {
        "BitReader"
    }
}

impl<S: SequentialRead + Dispose> Dispose for BitReader<S> {
    fn dispose(&mut self) -> Result<()> {
        if self.state.is_disposed() {
            return Ok(());
        }
        self.state = DisposeState::Disposed;
        self.cursor.clear();
        if self.ownership.disposes_inner() {
            self.inner.dispose()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxistream_core::io::IoStream;
    use oxistream_core::memory::MemoryStream;

    fn reader(data: &[u8], order: BitOrder) -> BitReader<MemoryStream<u64>> {
        BitReader::with_order(MemoryStream::from_vec(data.to_vec()).unwrap(), order)
    }

    /// Serves bytes from a slice and cancels a token after serving `cancel_after`.
    struct CancellingSource {
        data: Vec<u8>,
        served: usize,
        cancel_after: usize,
        token: CancellationToken,
    }

    impl Disposable for CancellingSource {
        fn is_disposed(&self) -> bool {
            false
        }
    }

    impl SequentialRead for CancellingSource {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
            if self.served == self.data.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.data[self.served];
            self.served += 1;
            if self.served == self.cancel_after {
                self.token.cancel();
            }
            Ok(1)
        }
    }

    #[test]
    fn test_msb_first() {
        let mut r = reader(&[0xB0], BitOrder::MsbFirst);
        let bits = r.read_bits(8).unwrap().unwrap();
        assert_eq!(bits.to_string(), "10110000");
        assert_eq!(r.read_bit().unwrap(), None);
    }

    #[test]
    fn test_lsb_first() {
        let mut r = reader(&[0x0D], BitOrder::LsbFirst);
        let bits = r.read_bits(8).unwrap().unwrap();
        assert_eq!(bits.to_string(), "10110000");
    }

    #[test]
    fn test_reads_across_bytes() {
        let mut r = reader(&[0xAB, 0xCD], BitOrder::MsbFirst);
        assert_eq!(r.read_value(4).unwrap(), Some(0xA));
        assert_eq!(r.read_value(8).unwrap(), Some(0xBC));
        assert_eq!(r.read_value(4).unwrap(), Some(0xD));
        assert_eq!(r.bits_read(), 16);
        assert_eq!(r.read_value(1).unwrap(), None);
    }

    #[test]
    fn test_all_or_nothing() {
        let mut r = reader(&[0xFF], BitOrder::MsbFirst);
        assert_eq!(r.read_bits(3).unwrap().map(|b| b.len()), Some(3));
        assert_eq!(r.read_bits(6).unwrap(), None);
        // The five leftover bits were discarded with the failed read.
        assert_eq!(r.read_bit().unwrap(), None);
        assert_eq!(r.read_bits(1).unwrap(), None);
        assert!(r.is_finished());
    }

    #[test]
    fn test_end_is_sticky() {
        let mut r = reader(&[], BitOrder::LsbFirst);
        assert_eq!(r.read_bit().unwrap(), None);
        assert_eq!(r.read_bit().unwrap(), None);
        assert_eq!(r.get_ref().stats().reads, 1);
    }

    #[test]
    fn test_read_bits_exact() {
        let mut r = reader(&[0x01], BitOrder::MsbFirst);
        assert_eq!(r.read_bits_exact(7).unwrap().to_u64(), Some(0));
        let err = r.read_bits_exact(2).unwrap_err();
        assert!(err.is_unexpected_eof());
    }

    #[test]
    fn test_zero_bits() {
        let mut r = reader(&[], BitOrder::MsbFirst);
        assert_eq!(r.read_bits(0).unwrap(), Some(Bits::new()));
        assert_eq!(r.read_value(0).unwrap(), Some(0));
        assert!(r.read_value(65).is_err());
    }

    #[test]
    fn test_align_to_byte() {
        let mut r = reader(&[0xFF, 0x80], BitOrder::MsbFirst);
        r.read_bits(3).unwrap();
        assert_eq!(r.align_to_byte().unwrap(), 5);
        assert_eq!(r.read_bit().unwrap(), Some(true));
        assert_eq!(r.read_bit().unwrap(), Some(false));
    }

    #[test]
    fn test_cancellation_keeps_assembled_bits() {
        let token = CancellationToken::new();
        let source = CancellingSource {
            data: vec![0xA5, 0x3C],
            served: 0,
            cancel_after: 1,
            token: token.clone(),
        };
        let mut r = BitReader::new(source).with_cancellation(token);

        let err = r.read_bits(12).unwrap_err();
        assert!(matches!(err, StreamError::Cancelled));
        assert_eq!(r.bits_read(), 0);

        let mut r = r.with_cancellation(CancellationToken::new());
        assert_eq!(r.read_value(12).unwrap(), Some(0xA53));
        assert_eq!(r.read_value(4).unwrap(), Some(0xC));
    }

    #[test]
    fn test_dispose() {
        let mut r = reader(&[0xFF], BitOrder::MsbFirst);
        r.read_bit().unwrap();
        r.dispose().unwrap();
        r.dispose().unwrap();
        assert!(r.read_bit().unwrap_err().is_disposed());
        assert!(r.read_bits(2).unwrap_err().is_disposed());
        assert!(r.read_bits(0).unwrap_err().is_disposed());
        assert!(r.read_value(0).unwrap_err().is_disposed());
        assert!(r.read_value(65).unwrap_err().is_disposed());
        assert!(r.read_bits_exact(0).unwrap_err().is_disposed());
        assert!(r.align_to_byte().unwrap_err().is_disposed());
        assert!(r.get_ref().is_disposed());
    }

    #[test]
    fn test_dispose_borrowed() {
        let mut stream = MemoryStream::<u16>::from_vec(vec![1]).unwrap();
        let mut r = BitReader::new(&mut stream).leave_open();
        r.dispose().unwrap();
        assert!(!stream.is_disposed());
    }

    #[test]
    fn test_dispose_over_std_reader() {
        let stream = IoStream::reader(&[0x80u8][..]);
        let mut r = BitReader::new(stream);
        assert_eq!(r.read_bit().unwrap(), Some(true));
        r.dispose().unwrap();
        assert!(r.get_ref().is_disposed());
    }
}

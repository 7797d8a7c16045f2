//! Suspending bit reader and writer.
//!
//! [`AsyncBitReader`] and [`AsyncBitWriter`] share their cursor bookkeeping
//! with the blocking adapters. They differ only in that each byte fetched or
//! written may yield to the scheduler.
//!
//! An [`AsyncBitWriter`] cannot flush when dropped. Call
//! [`AsyncBitWriter::flush`] or dispose it first; dropping it with pending
//! bits logs a warning.
//!
//! # Feature Flag
//!
//! This module is only available when the `async-io` feature is enabled.

use crate::bits::Bits;
use crate::cursor::{ReadCursor, WriteCursor};
use crate::order::BitOrder;
use oxistream_core::async_io::{AsyncDispose, AsyncSequentialRead, AsyncSequentialWrite, BoxFuture};
use oxistream_core::cancel::CancellationToken;
use oxistream_core::error::{Result, StreamError};
use oxistream_core::lifecycle::{DisposeState, Disposable, Ownership};
use std::mem::ManuallyDrop;
use std::ptr;

/// Suspending bit-level reader.
#[derive(Debug)]
pub struct AsyncBitReader<S: AsyncSequentialRead> {
    inner: S,
    cursor: ReadCursor,
    cancel: Option<CancellationToken>,
    ownership: Ownership,
    state: DisposeState,
}

impl<S: AsyncSequentialRead> AsyncBitReader<S> {
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

    /// Get a reference to the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Consume this reader and return the underlying stream.
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

    async fn fetch(&mut self) -> Result<bool> {
        if self.cursor.at_end() {
            return Ok(false);
        }
        if let Some(token) = &self.cancel {
            token.check()?;
        }
        match self.inner.read_byte_async().await? {
            Some(byte) => {
                log::trace!("bit reader fetched byte {:#04x}", byte);
                self.cursor.load(byte);
                Ok(true)
            }
            None => {
                self.cursor.mark_finished();
                Ok(false)
            }
        }
    }

    /// Read one bit. `None` once the underlying stream is exhausted.
    pub async fn read_bit(&mut self) -> Result<Option<bool>> {
        self.ensure_open()?;
        if let Some(bit) = self.cursor.next_buffered() {
            return Ok(Some(bit));
        }
        if self.fetch().await? {
            Ok(self.cursor.next_buffered())
        } else {
            Ok(None)
        }
    }

    /// Read `count` bits, or nothing.
    ///
    /// Fetched bytes stay in the cursor until `count` bits are buffered, so
    /// an error or a dropped future leaves them for the next read.
    pub async fn read_bits(&mut self, count: usize) -> Result<Option<Bits>> {
        self.ensure_open()?;
        while self.cursor.buffered() < count {
            if !self.fetch().await? {
                self.cursor.discard();
                return Ok(None);
            }
        }
        Ok(self.cursor.take(count))
    }

    /// Read exactly `count` bits, failing with `UnexpectedEof` on premature end.
    pub async fn read_bits_exact(&mut self, count: usize) -> Result<Bits> {
        self.read_bits(count)
            .await?
            .ok_or_else(|| StreamError::unexpected_eof(count as u64))
    }

    /// Read `count` bits (at most 64) as an unsigned number.
    pub async fn read_value(&mut self, count: u8) -> Result<Option<u64>> {
        self.ensure_open()?;
        if count > 64 {
            return Err(StreamError::invalid_argument(format!(
                "cannot read {} bits into a 64-bit value",
                count
            )));
        }
        Ok(self
            .read_bits(count as usize)
            .await?
            .and_then(|bits| bits.to_u64()))
    }

    /// Discard the rest of the current byte.
    pub fn align_to_byte(&mut self) -> Result<usize> {
        self.ensure_open()?;
        Ok(self.cursor.align())
    }
}

impl<S: AsyncSequentialRead> Disposable for AsyncBitReader<S> {
    fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }

    fn object_name(&self) -> &'static str {
        "AsyncBitReader"
    }
}

impl<S: AsyncSequentialRead + AsyncDispose> AsyncDispose for AsyncBitReader<S> {
    fn dispose_async(&mut self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if self.state.is_disposed() {
                return Ok(());
            }
            self.state = DisposeState::DisposedAsync;
            self.cursor.clear();
            if self.ownership.disposes_inner() {
                self.inner.dispose_async().await?;
            }
            Ok(())
        })
    }
}

/// Suspending bit-level writer.
#[derive(Debug)]
pub struct AsyncBitWriter<S: AsyncSequentialWrite> {
    inner: S,
    cursor: WriteCursor,
    ownership: Ownership,
    state: DisposeState,
}

impl<S: AsyncSequentialWrite> AsyncBitWriter<S> {
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

    /// Get a reference to the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Total number of bits written so far, padding excluded.
    pub fn bits_written(&self) -> u64 {
        self.cursor.bits_written()
    }

    /// Flush and return the underlying stream without disposing it.
    pub async fn into_inner(mut self) -> Result<S> {
        self.flush().await?;
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so `inner` is moved out exactly once.
        Ok(unsafe { ptr::read(&this.inner) })
    }

    async fn emit(&mut self) -> Result<()> {
        if let Some(byte) = self.cursor.completed() {
            self.inner.write_all_async(&[byte]).await?;
            self.cursor.reset();
        }
        Ok(())
    }

    /// Write a single bit.
    pub async fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.ensure_open()?;
        self.emit().await?;
        self.cursor.push(bit);
        self.emit().await
    }

    /// Write every bit of `bits`, in order.
    pub async fn write_bits(&mut self, bits: &Bits) -> Result<()> {
        self.ensure_open()?;
        for bit in bits {
            self.write_bit(bit).await?;
        }
        Ok(())
    }

    /// Write the low `count` bits (at most 64) of `value`, most significant
    /// first.
    pub async fn write_value(&mut self, value: u64, count: u8) -> Result<()> {
        self.ensure_open()?;
        if count > 64 {
            return Err(StreamError::invalid_argument(format!(
                "cannot write {} bits of a 64-bit value",
                count
            )));
        }
        for i in (0..count).rev() {
            self.write_bit((value >> i) & 1 == 1).await?;
        }
        Ok(())
    }

    /// Pad a partial byte with the fill bit, write it, and flush the
    /// underlying stream.
    pub async fn flush(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.cursor.pad();
        self.emit().await?;
        self.inner.flush_async().await
    }
}

impl<S: AsyncSequentialWrite> Disposable for AsyncBitWriter<S> {
    fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }

    fn object_name(&self) -> &'static str {
        "AsyncBitWriter"
    }
}

impl<S: AsyncSequentialWrite + AsyncDispose> AsyncDispose for AsyncBitWriter<S> {
    fn dispose_async(&mut self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if self.state.is_disposed() {
                return Ok(());
            }
            self.flush().await?;
            self.state = DisposeState::DisposedAsync;
            log::debug!("disposed bit writer after {} bits", self.bits_written());
            if self.ownership.disposes_inner() {
                self.inner.dispose_async().await?;
            }
            Ok(())
        })
    }
}

impl<S: AsyncSequentialWrite> Drop for AsyncBitWriter<S> {
    fn drop(&mut self) {
        if !self.state.is_disposed() && self.cursor.pending_bits() > 0 {
            log::warn!(
                "async bit writer dropped with {} unflushed bits; call flush first",
                self.cursor.pending_bits()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxistream_core::memory::MemoryStream;
    use std::future::Future;
    use std::task::{Context, Waker};

    /// Serves one byte per read. The read of byte `stall_at` never completes
    /// the first time it is attempted.
    struct StallingSource {
        data: Vec<u8>,
        served: usize,
        stall_at: usize,
        stalled: bool,
    }

    impl StallingSource {
        fn new(data: &[u8], stall_at: usize) -> Self {
            Self {
                data: data.to_vec(),
                served: 0,
                stall_at,
                stalled: false,
            }
        }
    }

    impl Disposable for StallingSource {
        fn is_disposed(&self) -> bool {
            false
        }
    }

    impl AsyncSequentialRead for StallingSource {
        fn read_async<'a>(&'a mut self, buf: &'a mut [u8]) -> BoxFuture<'a, usize> {
            Box::pin(async move {
                if self.served == self.stall_at && !self.stalled {
                    self.stalled = true;
                    std::future::pending::<()>().await;
                }
                match (buf.first_mut(), self.data.get(self.served)) {
                    (Some(slot), Some(&byte)) => {
                        *slot = byte;
                        self.served += 1;
                        Ok(1)
                    }
                    _ => Ok(0),
                }
            })
        }
    }

    /// Cancels `token` once `cancel_after` bytes were served.
    struct CancellingSource {
        inner: MemoryStream<u64>,
        cancel_after: usize,
        token: CancellationToken,
    }

    impl Disposable for CancellingSource {
        fn is_disposed(&self) -> bool {
            self.inner.is_disposed()
        }
    }

    impl AsyncSequentialRead for CancellingSource {
        fn read_async<'a>(&'a mut self, buf: &'a mut [u8]) -> BoxFuture<'a, usize> {
            Box::pin(async move {
                let n = self.inner.read_async(buf).await?;
                if self.inner.stats().reads == self.cancel_after {
                    self.token.cancel();
                }
                Ok(n)
            })
        }
    }

    /// Fails its first write call, then writes through to memory.
    struct FailOnce {
        inner: MemoryStream<u64>,
        failed: bool,
    }

    impl Disposable for FailOnce {
        fn is_disposed(&self) -> bool {
            self.inner.is_disposed()
        }
    }

    impl AsyncSequentialWrite for FailOnce {
        fn write_async<'a>(&'a mut self, buf: &'a [u8]) -> BoxFuture<'a, usize> {
            Box::pin(async move {
                if !self.failed {
                    self.failed = true;
                    return Err(StreamError::Io(std::io::Error::new(
                        std::io::ErrorKind::Interrupted,
                        "injected failure",
                    )));
                }
                self.inner.write_async(buf).await
            })
        }

        fn flush_async(&mut self) -> BoxFuture<'_, ()> {
            self.inner.flush_async()
        }
    }

    #[tokio::test]
    async fn test_async_bit_order() {
        let bits: Bits = "10110000".parse().unwrap();
        for (order, expected) in [(BitOrder::MsbFirst, 0xB0u8), (BitOrder::LsbFirst, 0x0D)] {
            let mut w = AsyncBitWriter::with_order(MemoryStream::<u64>::new(), order);
            w.write_bits(&bits).await.unwrap();
            let stream = w.into_inner().await.unwrap();
            assert_eq!(stream.as_slice(), &[expected]);

            let data = stream.into_inner();
            let mut r = AsyncBitReader::with_order(MemoryStream::<u64>::from_vec(data).unwrap(), order);
            assert_eq!(r.read_bits(8).await.unwrap(), Some(bits.clone()));
            assert_eq!(r.read_bit().await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn test_async_all_or_nothing() {
        let stream = MemoryStream::<u32>::from_vec(vec![0x0F]).unwrap();
        let mut r = AsyncBitReader::new(stream);
        assert_eq!(r.read_value(4).await.unwrap(), Some(0));
        assert_eq!(r.read_value(5).await.unwrap(), None);
        assert!(r.is_finished());
        assert!(r.read_bits_exact(1).await.unwrap_err().is_unexpected_eof());
    }

    #[tokio::test]
    async fn test_async_cancelled_before_fetch() {
        let token = CancellationToken::new();
        token.cancel();
        let stream = MemoryStream::<u64>::from_vec(vec![0xFF]).unwrap();
        let mut r = AsyncBitReader::new(stream).with_cancellation(token);
        assert!(matches!(r.read_bit().await, Err(StreamError::Cancelled)));
        assert_eq!(r.get_ref().stats().reads, 0);
    }

    #[tokio::test]
    async fn test_async_dispose() {
        let mut w = AsyncBitWriter::new(MemoryStream::<u64>::new()).with_fill(true);
        w.write_bit(false).await.unwrap();
        w.dispose_async().await.unwrap();
        w.dispose_async().await.unwrap();
        assert_eq!(w.get_ref().as_slice(), &[0x7F]);
        assert!(w.get_ref().is_disposed());
        assert!(w.write_bit(true).await.unwrap_err().is_disposed());
        assert!(w.write_bits(&Bits::new()).await.unwrap_err().is_disposed());
        assert!(w.write_value(1, 0).await.unwrap_err().is_disposed());
        assert!(w.write_value(1, 65).await.unwrap_err().is_disposed());

        let mut r = AsyncBitReader::new(MemoryStream::<u64>::from_vec(vec![0xFF]).unwrap());
        r.dispose_async().await.unwrap();
        assert!(r.read_bit().await.unwrap_err().is_disposed());
        assert!(r.read_bits(0).await.unwrap_err().is_disposed());
        assert!(r.read_value(0).await.unwrap_err().is_disposed());
        assert!(r.read_value(65).await.unwrap_err().is_disposed());
        assert!(r.align_to_byte().unwrap_err().is_disposed());
    }

    #[tokio::test]
    async fn test_async_dropped_read_keeps_fetched_bits() {
        let mut r = AsyncBitReader::new(StallingSource::new(&[0xA5, 0x3C], 1));
        {
            let mut read = Box::pin(r.read_bits(12));
            let mut cx = Context::from_waker(Waker::noop());
            assert!(read.as_mut().poll(&mut cx).is_pending());
        }
        assert_eq!(r.bits_read(), 0);
        assert_eq!(r.read_value(12).await.unwrap(), Some(0xA53));
        assert_eq!(r.read_value(4).await.unwrap(), Some(0xC));
        assert_eq!(r.read_bit().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_async_cancellation_keeps_assembled_bits() {
        let token = CancellationToken::new();
        let source = CancellingSource {
            inner: MemoryStream::from_vec(vec![0xA5, 0x3C]).unwrap(),
            cancel_after: 1,
            token: token.clone(),
        };
        let mut r = AsyncBitReader::new(source).with_cancellation(token);

        let err = r.read_bits(12).await.unwrap_err();
        assert!(matches!(err, StreamError::Cancelled));
        assert_eq!(r.bits_read(), 0);

        let mut r = r.with_cancellation(CancellationToken::new());
        assert_eq!(r.read_value(12).await.unwrap(), Some(0xA53));
        assert_eq!(r.read_value(4).await.unwrap(), Some(0xC));
    }

    #[tokio::test]
    async fn test_async_align_and_exact() {
        let stream = MemoryStream::<u64>::from_vec(vec![0xFF, 0x80, 0x01]).unwrap();
        let mut r = AsyncBitReader::new(stream);
        r.read_bits(3).await.unwrap();
        assert_eq!(r.align_to_byte().unwrap(), 5);
        assert_eq!(r.read_bit().await.unwrap(), Some(true));
        assert_eq!(r.read_bit().await.unwrap(), Some(false));
        assert_eq!(r.align_to_byte().unwrap(), 6);
        assert_eq!(r.read_bits_exact(8).await.unwrap().to_u64(), Some(1));
        assert_eq!(r.bits_read(), 24);
    }

    #[tokio::test]
    async fn test_async_failed_byte_write_is_retried() {
        let mut w = AsyncBitWriter::new(FailOnce {
            inner: MemoryStream::new(),
            failed: false,
        });
        assert!(w.write_value(0xAB, 8).await.is_err());
        assert_eq!(w.bits_written(), 8);
        assert!(w.get_ref().inner.as_slice().is_empty());

        w.write_bit(true).await.unwrap();
        let stream = w.into_inner().await.unwrap();
        assert_eq!(stream.inner.as_slice(), &[0xAB, 0x80]);
    }
}

//! Buffered random-access output stream.
//!
//! [`BufferedOutput`] accumulates small writes in a write-back cache and
//! hands them to the underlying stream in one call when the cache fills, or
//! when the caller flushes, seeks, changes the length or disposes the stream.
//!
//! # Length under pending writes
//!
//! Cached bytes logically extend the stream before they are physically
//! written, so while the cache is non-empty the visible length is
//!
//! ```text
//! max(underlying length, (underlying position - zero) + cached bytes)
//! ```
//!
//! # Failure policy
//!
//! If the underlying stream fails part-way through a drain, the bytes it did
//! accept are removed from the cache and the rest stay cached, in order. No
//! byte is written twice and none is dropped silently; the error is returned
//! to the caller.
//!
//! # Example
//!
//! ```
//! use oxistream_buffered::BufferedOutput;
//! use oxistream_core::memory::MemoryStream;
//! use oxistream_core::traits::{RandomAccess, SequentialWrite};
//!
//! let mut output = BufferedOutput::with_capacity(MemoryStream::<u64>::new(), 4).unwrap();
//! output.write_all(b"abc").unwrap();
//!
//! // Nothing reached the underlying stream yet, but the length already counts it.
//! assert_eq!(output.get_ref().as_slice(), b"");
//! assert_eq!(output.length().unwrap(), 3);
//!
//! let inner = output.into_inner().unwrap();
//! assert_eq!(inner.as_slice(), b"abc");
//! ```

use crate::cache::WriteCache;
use crate::options::BufferOptions;
use oxistream_core::error::{Result, StreamError};
use oxistream_core::lifecycle::{DisposeState, Disposable, Dispose};
use oxistream_core::position::{
    OffsetOf, StreamOffset, StreamPosition, advance, distance, offset_from_len,
};
use oxistream_core::traits::{Positioned, RandomAccess, RandomAccessWrite, SequentialWrite};
use std::mem::ManuallyDrop;
use std::ptr;

/// A write-back cache in front of a random-access output stream.
///
/// Dropping an undisposed stream drains the cache on a best-effort basis and
/// logs a failure. Call [`Dispose::dispose`] or [`BufferedOutput::into_inner`]
/// to observe errors.
#[derive(Debug)]
pub struct BufferedOutput<S: RandomAccessWrite> {
    inner: S,
    cache: WriteCache,
    options: BufferOptions,
    state: DisposeState,
}

impl<S: RandomAccessWrite> BufferedOutput<S> {
    /// Wrap `inner` with a default-sized cache, taking ownership of it.
    pub fn new(inner: S) -> Self {
        Self::build(inner, BufferOptions::default())
    }

    /// Wrap `inner` with a cache of `capacity` bytes.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidArgument` for a zero capacity.
    pub fn with_capacity(inner: S, capacity: usize) -> Result<Self> {
        Self::with_options(inner, BufferOptions::new().with_capacity(capacity))
    }

    /// Wrap `inner` with explicit options.
    pub fn with_options(inner: S, options: BufferOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self::build(inner, options))
    }

    fn build(inner: S, options: BufferOptions) -> Self {
        Self {
            inner,
            cache: WriteCache::new(options.capacity),
            options,
            state: DisposeState::Open,
        }
    }

    /// Get a reference to the underlying stream.
    ///
    /// Cached bytes are not visible through it until the cache is drained.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Cache capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.cache.capacity()
    }

    /// Number of bytes accepted but not yet written to the underlying stream.
    pub fn buffered_len(&self) -> usize {
        self.cache.len()
    }

    /// Options the stream was built with.
    pub fn options(&self) -> BufferOptions {
        self.options
    }

    /// Drain the cache and return the underlying stream without disposing it.
    ///
    /// On error the stream is dropped, which retries the drain once more.
    pub fn into_inner(mut self) -> Result<S> {
        if !self.state.is_disposed() {
            self.drain()?;
        }
        let mut this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so `inner` is moved out exactly once.
        let inner = unsafe { ptr::read(&this.inner) };
        // SAFETY: the cache is dropped exactly once here and never touched again.
        unsafe { ptr::drop_in_place(&mut this.cache) };
        Ok(inner)
    }

    /// Write every cached byte to the underlying stream.
    ///
    /// On failure the accepted prefix is removed from the cache before the
    /// error is returned.
    fn drain(&mut self) -> Result<()> {
        let pending = self.cache.len();
        while !self.cache.is_empty() {
            match self.inner.write(self.cache.pending()) {
                Ok(0) => return Err(StreamError::write_zero()),
                Ok(n) => self.cache.consume(n),
                Err(e) => {
                    log::debug!(
                        "drain stopped after {} of {} bytes: {}",
                        pending - self.cache.len(),
                        pending,
                        e
                    );
                    return Err(e);
                }
            }
        }
        if pending > 0 {
            log::trace!("write cache drained {} bytes", pending);
        }
        Ok(())
    }
}

impl<S: RandomAccessWrite> Disposable for BufferedOutput<S> {
    fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }

    fn object_name(&self) -> &'static str {
        "BufferedOutput"
    }
}

impl<S: RandomAccessWrite + Dispose> Dispose for BufferedOutput<S> {
    /// Drain the cache, flush and release the stream.
    ///
    /// If the drain fails the stream stays open with the unwritten bytes
    /// still cached, so the call can be retried.
    fn dispose(&mut self) -> Result<()> {
        if self.state.is_disposed() {
            return Ok(());
        }
        self.drain()?;
        self.inner.flush()?;

        self.state = DisposeState::Disposed;
        self.cache.release();
        log::debug!("disposed buffered output ({:?})", self.options.ownership);
        if self.options.ownership.disposes_inner() {
            self.inner.dispose()?;
        }
        Ok(())
    }
}

impl<S: RandomAccessWrite> SequentialWrite for BufferedOutput<S> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.ensure_open()?;
        if buf.is_empty() {
            return Ok(0);
        }
        if self.cache.is_full() {
            self.drain()?;
        }

        let accepted = buf.len().min(self.cache.space());
        // The logical position after this write must stay representable.
        advance(
            self.inner.position()?,
            offset_from_len(self.cache.len() + accepted, "BufferedOutput::write")?,
            "BufferedOutput::write",
        )?;
        Ok(self.cache.push(&buf[..accepted]))
    }

    fn flush(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.drain()?;
        self.inner.flush()
    }
}

impl<S: RandomAccessWrite> Positioned for BufferedOutput<S> {
    type Position = S::Position;

    fn position(&self) -> Result<S::Position> {
        self.ensure_open()?;
        advance(
            self.inner.position()?,
            offset_from_len(self.cache.len(), "BufferedOutput::position")?,
            "BufferedOutput::position",
        )
    }
}

impl<S: RandomAccessWrite> RandomAccess for BufferedOutput<S> {
    fn length(&self) -> Result<OffsetOf<S::Position>> {
        self.ensure_open()?;
        let physical = self.inner.length()?;
        if self.cache.is_empty() {
            return Ok(physical);
        }

        let cached_end = distance(
            self.inner.position()?,
            S::Position::ZERO,
            "BufferedOutput::length",
        )?
        .checked_add(offset_from_len(self.cache.len(), "BufferedOutput::length")?)
        .ok_or_else(|| StreamError::overflow("BufferedOutput::length"))?;
        Ok(physical.max(cached_end))
    }

    fn seek(&mut self, position: S::Position) -> Result<()> {
        self.ensure_open()?;
        self.drain()?;
        log::debug!("buffered output seek to {}", position);
        self.inner.seek(position)
    }

    fn set_length(&mut self, length: OffsetOf<S::Position>) -> Result<()> {
        self.ensure_open()?;
        self.drain()?;
        log::debug!("buffered output length set to {}", length);
        self.inner.set_length(length)
    }
}

impl<S: RandomAccessWrite> Drop for BufferedOutput<S> {
    fn drop(&mut self) {
        if self.state.is_disposed() || self.cache.is_empty() {
            return;
        }
        if let Err(e) = self.drain() {
            log::warn!(
                "dropping buffered output with {} unwritten bytes: {}",
                self.cache.len(),
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxistream_core::memory::MemoryStream;

    fn output(capacity: usize) -> BufferedOutput<MemoryStream<u64>> {
        BufferedOutput::with_capacity(MemoryStream::new(), capacity).unwrap()
    }

    #[test]
    fn test_writes_are_batched() {
        let mut out = output(4);
        out.write_all(b"0123456789").unwrap();
        assert_eq!(out.get_ref().stats().writes, 2);
        assert_eq!(out.buffered_len(), 2);

        let inner = out.into_inner().unwrap();
        assert_eq!(inner.stats().writes, 3);
        assert_eq!(inner.as_slice(), b"0123456789");
    }

    #[test]
    fn test_full_cache_drained_on_next_write() {
        let mut out = output(4);
        assert_eq!(out.write(b"abcdef").unwrap(), 4);
        assert_eq!(out.get_ref().stats().writes, 0);
        assert_eq!(out.write(b"ef").unwrap(), 2);
        assert_eq!(out.get_ref().stats().writes, 1);
        assert_eq!(out.get_ref().as_slice(), b"abcd");
    }

    #[test]
    fn test_length_includes_cached_bytes() {
        let mut out = output(16);
        out.write_all(b"hello").unwrap();
        assert_eq!(out.get_ref().length().unwrap(), 0);
        assert_eq!(out.length().unwrap(), 5);
        assert_eq!(out.position().unwrap(), 5);
        assert_eq!(out.end_of_stream().unwrap(), 5);
    }

    #[test]
    fn test_length_is_max_of_physical_and_cached() {
        let mut out = output(16);
        out.write_all(b"0123456789").unwrap();
        out.seek(2).unwrap();
        out.write_all(b"ab").unwrap();
        // Overwriting inside the stream does not shrink it.
        assert_eq!(out.length().unwrap(), 10);
        assert_eq!(out.position().unwrap(), 4);

        let inner = out.into_inner().unwrap();
        assert_eq!(inner.as_slice(), b"01ab456789");
    }

    #[test]
    fn test_seek_flushes_at_old_position() {
        let mut out = output(8);
        out.write_all(b"abc").unwrap();
        out.seek(10).unwrap();
        assert_eq!(out.get_ref().as_slice(), b"abc");
        assert_eq!(out.buffered_len(), 0);
        assert_eq!(out.position().unwrap(), 10);
    }

    #[test]
    fn test_seek_beyond_end_with_pending_bytes() {
        let mut out = output(8);
        out.write_all(b"xy").unwrap();
        out.seek(6).unwrap();
        // Seeking alone does not extend the stream.
        assert_eq!(out.length().unwrap(), 2);

        out.write_all(b"z").unwrap();
        assert_eq!(out.length().unwrap(), 7);

        let inner = out.into_inner().unwrap();
        assert_eq!(inner.as_slice(), b"xy\0\0\0\0z");
    }

    #[test]
    fn test_set_length_flushes_first() {
        let mut out = output(8);
        out.write_all(b"abcdef").unwrap();
        out.set_length(4).unwrap();
        assert_eq!(out.buffered_len(), 0);
        assert_eq!(out.get_ref().as_slice(), b"abcd");
        assert_eq!(out.length().unwrap(), 4);
    }

    #[test]
    fn test_flush_is_idempotent() {
        let mut out = output(8);
        out.write_all(b"abc").unwrap();
        out.flush().unwrap();
        out.flush().unwrap();
        let stats = out.get_ref().stats();
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.flushes, 2);
    }

    #[test]
    fn test_dispose_drains_and_disposes_inner() {
        let mut out = output(8);
        out.write_all(b"abc").unwrap();
        out.dispose().unwrap();
        out.dispose().unwrap();

        assert_eq!(out.get_ref().as_slice(), b"abc");
        assert!(out.get_ref().is_disposed());
        assert!(out.write(b"x").unwrap_err().is_disposed());
        assert!(out.flush().unwrap_err().is_disposed());
        assert!(out.position().unwrap_err().is_disposed());
        assert!(out.length().unwrap_err().is_disposed());
        assert!(out.seek(0).unwrap_err().is_disposed());
        assert!(out.set_length(0).unwrap_err().is_disposed());
        assert!(out.end_of_stream().unwrap_err().is_disposed());
    }

    #[test]
    fn test_drop_drains_borrowed_stream() {
        let mut inner: MemoryStream<u32> = MemoryStream::new();
        {
            let options = BufferOptions::new().with_capacity(8).leave_open();
            let mut out = BufferedOutput::with_options(&mut inner, options).unwrap();
            out.write_all(b"dropped").unwrap();
        }
        assert_eq!(inner.as_slice(), b"dropped");
        assert!(!inner.is_disposed());
    }

    #[test]
    fn test_position_overflow_detected() {
        let mut inner: MemoryStream<u16> = MemoryStream::new();
        inner.seek(u16::MAX - 2).unwrap();
        let mut out = BufferedOutput::with_capacity(inner, 8).unwrap();
        let err = out.write(b"abcd").unwrap_err();
        assert!(matches!(err, StreamError::Overflow { .. }));
        assert_eq!(out.buffered_len(), 0);
    }
}

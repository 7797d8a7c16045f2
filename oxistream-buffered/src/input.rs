//! Buffered random-access input stream.
//!
//! [`BufferedInput`] batches reads against an expensive underlying stream
//! into cache-sized blocks. The cache is refilled lazily when it runs dry and
//! discarded on every seek, because its bytes were read from the old
//! physical position.
//!
//! # Example
//!
//! ```
//! use oxistream_buffered::BufferedInput;
//! use oxistream_core::memory::MemoryStream;
//! use oxistream_core::traits::{Positioned, RandomAccess, SequentialRead};
//!
//! let inner = MemoryStream::<u64>::from_vec(b"hello world".to_vec()).unwrap();
//! let mut input = BufferedInput::with_capacity(inner, 4).unwrap();
//!
//! let mut word = [0u8; 5];
//! input.read_exact(&mut word).unwrap();
//! assert_eq!(&word, b"hello");
//! assert_eq!(input.position().unwrap(), 5);
//!
//! input.seek(6).unwrap();
//! input.read_exact(&mut word).unwrap();
//! assert_eq!(&word, b"world");
//! ```

use crate::cache::ReadCache;
use crate::options::BufferOptions;
use oxistream_core::error::Result;
use oxistream_core::lifecycle::{DisposeState, Disposable, Dispose};
use oxistream_core::position::{OffsetOf, StreamOffset, offset_from_len, retreat};
use oxistream_core::traits::{Positioned, RandomAccess, RandomAccessRead, SequentialRead};

/// A read-ahead cache in front of a random-access input stream.
///
/// The visible position is the underlying position minus the number of
/// cached bytes not yet consumed.
#[derive(Debug)]
pub struct BufferedInput<S> {
    inner: S,
    cache: ReadCache,
    options: BufferOptions,
    state: DisposeState,
}

impl<S: RandomAccessRead> BufferedInput<S> {
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
            cache: ReadCache::new(options.capacity),
            options,
            state: DisposeState::Open,
        }
    }

    /// Get a reference to the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Cache capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.cache.capacity()
    }

    /// Number of cached bytes not yet consumed.
    pub fn buffered_len(&self) -> usize {
        self.cache.available()
    }

    /// Options the stream was built with.
    pub fn options(&self) -> BufferOptions {
        self.options
    }

    /// Return the underlying stream, repositioned to the logical position so
    /// no cached byte is skipped.
    pub fn into_inner(mut self) -> Result<S> {
        if !self.cache.is_empty() && !self.state.is_disposed() {
            let position = self.position()?;
            self.cache.invalidate();
            self.inner.seek(position)?;
        }
        Ok(self.inner)
    }

    /// Read one cache-worth (or the rest of the stream, if shorter).
    fn refill(&mut self) -> Result<usize> {
        let remaining = self.inner.remaining()?.saturating_to_usize();
        let target = self.cache.fill_target(remaining);
        if target.is_empty() {
            return Ok(0);
        }
        let n = self.inner.read(target)?;
        self.cache.set_filled(n);
        log::trace!("read cache refilled with {} bytes", n);
        Ok(n)
    }
}

impl<S> Disposable for BufferedInput<S> {
    fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }

    fn object_name(&self) -> &'static str {
        "BufferedInput"
    }
}

impl<S: RandomAccessRead + Dispose> Dispose for BufferedInput<S> {
    fn dispose(&mut self) -> Result<()> {
        if self.state.is_disposed() {
            return Ok(());
        }
        self.state = DisposeState::Disposed;
        self.cache.release();
        log::debug!("disposed buffered input ({:?})", self.options.ownership);
        if self.options.ownership.disposes_inner() {
            self.inner.dispose()?;
        }
        Ok(())
    }
}

impl<S: RandomAccessRead> SequentialRead for BufferedInput<S> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.ensure_open()?;
        if buf.is_empty() {
            return Ok(0);
        }

        if self.cache.is_empty() {
            if buf.len() >= self.cache.capacity() {
                log::debug!("read of {} bytes bypasses the cache", buf.len());
                return self.inner.read(buf);
            }
            if self.refill()? == 0 {
                return Ok(0);
            }
        }

        Ok(self.cache.consume_into(buf))
    }
}

impl<S: RandomAccessRead> Positioned for BufferedInput<S> {
    type Position = S::Position;

    fn position(&self) -> Result<S::Position> {
        self.ensure_open()?;
        let physical = self.inner.position()?;
        if self.cache.is_empty() {
            return Ok(physical);
        }
        retreat(
            physical,
            offset_from_len(self.cache.available(), "BufferedInput::position")?,
            "BufferedInput::position",
        )
    }
}

impl<S: RandomAccessRead> RandomAccess for BufferedInput<S> {
    fn length(&self) -> Result<OffsetOf<S::Position>> {
        self.ensure_open()?;
        self.inner.length()
    }

    fn seek(&mut self, position: S::Position) -> Result<()> {
        self.ensure_open()?;
        log::debug!(
            "seek to {} discards {} cached bytes",
            position,
            self.cache.available()
        );
        self.cache.invalidate();
        self.inner.seek(position)
    }
}

//! Suspending versions of the buffered streams.
//!
//! [`AsyncBufferedInput`] and [`AsyncBufferedOutput`] share their cache
//! bookkeeping with the blocking types and produce identical observable
//! results. Control is yielded only at calls into the underlying stream.
//!
//! Unlike [`crate::BufferedOutput`], an [`AsyncBufferedOutput`] cannot drain
//! its cache when dropped: call [`AsyncDispose::dispose_async`] (or
//! [`AsyncBufferedOutput::into_inner`]) before letting it go. Dropping it
//! with pending bytes logs a warning.
//!
//! # Feature Flag
//!
//! This module is only available when the `async-io` feature is enabled.

use crate::cache::{ReadCache, WriteCache};
use crate::options::BufferOptions;
use oxistream_core::async_io::{
    AsyncDispose, AsyncRandomAccess, AsyncSequentialRead, AsyncSequentialWrite, BoxFuture,
};
use oxistream_core::error::{Result, StreamError};
use oxistream_core::lifecycle::{DisposeState, Disposable};
use oxistream_core::position::{
    OffsetOf, StreamOffset, StreamPosition, advance, distance, offset_from_len, retreat,
};
use oxistream_core::traits::Positioned;
use std::mem::ManuallyDrop;
use std::ptr;

/// Bytes between the position of `stream` and its end, zero when past the end.
async fn remaining_async<S: AsyncRandomAccess + ?Sized>(
    stream: &mut S,
) -> Result<OffsetOf<S::Position>> {
    let consumed = distance(stream.position()?, S::Position::ZERO, "remaining")?;
    Ok(stream
        .length_async()
        .await?
        .checked_sub(consumed)
        .unwrap_or(<OffsetOf<S::Position> as StreamOffset>::ZERO))
}

/// Suspending read-ahead cache in front of a random-access input stream.
#[derive(Debug)]
pub struct AsyncBufferedInput<S> {
    inner: S,
    cache: ReadCache,
    options: BufferOptions,
    state: DisposeState,
}

impl<S: AsyncRandomAccess + AsyncSequentialRead> AsyncBufferedInput<S> {
    /// Wrap `inner` with a default-sized cache, taking ownership of it.
    pub fn new(inner: S) -> Self {
        Self::build(inner, BufferOptions::default())
    }

    /// Wrap `inner` with a cache of `capacity` bytes.
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

    /// Number of cached bytes not yet consumed.
    pub fn buffered_len(&self) -> usize {
        self.cache.available()
    }

    /// Return the underlying stream, repositioned to the logical position.
    pub async fn into_inner(mut self) -> Result<S> {
        if !self.cache.is_empty() && !self.state.is_disposed() {
            let position = self.position()?;
            self.cache.invalidate();
            self.inner.seek_async(position).await?;
        }
        Ok(self.inner)
    }

    async fn refill(&mut self) -> Result<usize> {
        let remaining = remaining_async(&mut self.inner).await?.saturating_to_usize();
        let target = self.cache.fill_target(remaining);
        if target.is_empty() {
            return Ok(0);
        }
        let n = self.inner.read_async(target).await?;
        self.cache.set_filled(n);
        log::trace!("read cache refilled with {} bytes", n);
        Ok(n)
    }
}

impl<S> Disposable for AsyncBufferedInput<S> {
    fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }

    fn object_name(&self) -> &'static str {
        "AsyncBufferedInput"
    }
}

impl<S: AsyncRandomAccess + AsyncSequentialRead> AsyncSequentialRead for AsyncBufferedInput<S> {
    fn read_async<'a>(&'a mut self, buf: &'a mut [u8]) -> BoxFuture<'a, usize> {
        Box::pin(async move {
            self.ensure_open()?;
            if buf.is_empty() {
                return Ok(0);
            }

            if self.cache.is_empty() {
                if buf.len() >= self.cache.capacity() {
                    log::debug!("read of {} bytes bypasses the cache", buf.len());
                    return self.inner.read_async(buf).await;
                }
                if self.refill().await? == 0 {
                    return Ok(0);
                }
            }

            Ok(self.cache.consume_into(buf))
        })
    }
}

impl<S: AsyncRandomAccess + AsyncSequentialRead> Positioned for AsyncBufferedInput<S> {
    type Position = S::Position;

    fn position(&self) -> Result<S::Position> {
        self.ensure_open()?;
        let physical = self.inner.position()?;
        if self.cache.is_empty() {
            return Ok(physical);
        }
        retreat(
            physical,
            offset_from_len(self.cache.available(), "AsyncBufferedInput::position")?,
            "AsyncBufferedInput::position",
        )
    }
}

impl<S: AsyncRandomAccess + AsyncSequentialRead> AsyncRandomAccess for AsyncBufferedInput<S> {
    fn length_async(&mut self) -> BoxFuture<'_, OffsetOf<S::Position>> {
        Box::pin(async move {
            self.ensure_open()?;
            self.inner.length_async().await
        })
    }

    fn seek_async(&mut self, position: S::Position) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.ensure_open()?;
            log::debug!(
                "seek to {} discards {} cached bytes",
                position,
                self.cache.available()
            );
            self.cache.invalidate();
            self.inner.seek_async(position).await
        })
    }
}

impl<S: AsyncRandomAccess + AsyncSequentialRead + AsyncDispose> AsyncDispose
    for AsyncBufferedInput<S>
{
    fn dispose_async(&mut self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if self.state.is_disposed() {
                return Ok(());
            }
            self.state = DisposeState::DisposedAsync;
            self.cache.release();
            log::debug!("disposed buffered input ({:?})", self.options.ownership);
            if self.options.ownership.disposes_inner() {
                self.inner.dispose_async().await?;
            }
            Ok(())
        })
    }
}

/// Suspending write-back cache in front of a random-access output stream.
#[derive(Debug)]
pub struct AsyncBufferedOutput<S> {
    inner: S,
    cache: WriteCache,
    options: BufferOptions,
    state: DisposeState,
}

impl<S: AsyncRandomAccess + AsyncSequentialWrite> AsyncBufferedOutput<S> {
    /// Wrap `inner` with a default-sized cache, taking ownership of it.
    pub fn new(inner: S) -> Self {
        Self::build(inner, BufferOptions::default())
    }

    /// Wrap `inner` with a cache of `capacity` bytes.
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
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Number of bytes accepted but not yet written to the underlying stream.
    pub fn buffered_len(&self) -> usize {
        self.cache.len()
    }

    /// Drain the cache and return the underlying stream without disposing it.
    pub async fn into_inner(mut self) -> Result<S> {
        if !self.state.is_disposed() {
            self.drain().await?;
        }
        let mut this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so `inner` is moved out exactly once.
        let inner = unsafe { ptr::read(&this.inner) };
        // SAFETY: the cache is dropped exactly once here and never touched again.
        unsafe { ptr::drop_in_place(&mut this.cache) };
        Ok(inner)
    }

    /// Write the cache out. Each chunk the provider accepts is trimmed from
    /// the cache before the next write is attempted.
    async fn drain(&mut self) -> Result<()> {
        let pending = self.cache.len();
        while !self.cache.is_empty() {
            match self.inner.write_async(self.cache.pending()).await {
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

impl<S> Disposable for AsyncBufferedOutput<S> {
    fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }

    fn object_name(&self) -> &'static str {
        "AsyncBufferedOutput"
    }
}

impl<S: AsyncRandomAccess + AsyncSequentialWrite> AsyncSequentialWrite for AsyncBufferedOutput<S> {
    fn write_async<'a>(&'a mut self, buf: &'a [u8]) -> BoxFuture<'a, usize> {
        Box::pin(async move {
            self.ensure_open()?;
            if buf.is_empty() {
                return Ok(0);
            }
            if self.cache.is_full() {
                self.drain().await?;
            }

            let accepted = buf.len().min(self.cache.space());
            advance(
                self.inner.position()?,
                offset_from_len(self.cache.len() + accepted, "AsyncBufferedOutput::write")?,
                "AsyncBufferedOutput::write",
            )?;
            Ok(self.cache.push(&buf[..accepted]))
        })
    }

    fn flush_async(&mut self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.ensure_open()?;
            self.drain().await?;
            self.inner.flush_async().await
        })
    }
}

impl<S: AsyncRandomAccess + AsyncSequentialWrite> Positioned for AsyncBufferedOutput<S> {
    type Position = S::Position;

    fn position(&self) -> Result<S::Position> {
        self.ensure_open()?;
        advance(
            self.inner.position()?,
            offset_from_len(self.cache.len(), "AsyncBufferedOutput::position")?,
            "AsyncBufferedOutput::position",
        )
    }
}

impl<S: AsyncRandomAccess + AsyncSequentialWrite> AsyncRandomAccess for AsyncBufferedOutput<S> {
    fn length_async(&mut self) -> BoxFuture<'_, OffsetOf<S::Position>> {
        Box::pin(async move {
            self.ensure_open()?;
            let physical = self.inner.length_async().await?;
            if self.cache.is_empty() {
                return Ok(physical);
            }

            let cached_end = distance(
                self.inner.position()?,
                S::Position::ZERO,
                "AsyncBufferedOutput::length",
            )?
            .checked_add(offset_from_len(
                self.cache.len(),
                "AsyncBufferedOutput::length",
            )?)
            .ok_or_else(|| StreamError::overflow("AsyncBufferedOutput::length"))?;
            Ok(physical.max(cached_end))
        })
    }

    fn seek_async(&mut self, position: S::Position) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.ensure_open()?;
            self.drain().await?;
            log::debug!("buffered output seek to {}", position);
            self.inner.seek_async(position).await
        })
    }

    fn set_length_async(&mut self, length: OffsetOf<S::Position>) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.ensure_open()?;
            self.drain().await?;
            log::debug!("buffered output length set to {}", length);
            self.inner.set_length_async(length).await
        })
    }
}

impl<S: AsyncRandomAccess + AsyncSequentialWrite + AsyncDispose> AsyncDispose
    for AsyncBufferedOutput<S>
{
    fn dispose_async(&mut self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if self.state.is_disposed() {
                return Ok(());
            }
            self.drain().await?;
            self.inner.flush_async().await?;

            self.state = DisposeState::DisposedAsync;
            self.cache.release();
            log::debug!("disposed buffered output ({:?})", self.options.ownership);
            if self.options.ownership.disposes_inner() {
                self.inner.dispose_async().await?;
            }
            Ok(())
        })
    }
}

impl<S> Drop for AsyncBufferedOutput<S> {
    fn drop(&mut self) {
        if !self.state.is_disposed() && !self.cache.is_empty() {
            log::warn!(
                "async buffered output dropped with {} unwritten bytes; call dispose_async first",
                self.cache.len()
            );
        }
    }
}

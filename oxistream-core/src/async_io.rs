//! Async (suspending) versions of the stream traits.
//!
//! Every blocking operation in [`crate::traits`] has a suspending counterpart
//! here with identical observable results. The only difference is that
//! control may be yielded back to the scheduler at each underlying I/O call.
//!
//! Methods return boxed futures so the traits stay object safe and usable
//! from any async runtime. [`TokioStream`] adapts Tokio's `AsyncRead` and
//! `AsyncWrite` into the sequential traits.
//!
//! # Example
//!
//! ```rust,ignore
//! use oxistream_core::async_io::{AsyncSequentialRead, TokioStream};
//!
//! async fn first_byte() -> oxistream_core::Result<Option<u8>> {
//!     let file = tokio::fs::File::open("data.bin").await?;
//!     let mut stream = TokioStream::new(file);
//!     stream.read_byte_async().await
//! }
//! ```
//!
//! # Feature Flag
//!
//! This module is only available when the `async-io` feature is enabled:
//!
//! ```toml
//! [dependencies]
//! oxistream-core = { version = "0.1.0", features = ["async-io"] }
//! ```

use crate::error::{Result, StreamError};
use crate::lifecycle::{DisposeState, Disposable};
use crate::position::{OffsetOf, advance};
use crate::traits::Positioned;
use std::future::Future;
use std::pin::Pin;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// A boxed, sendable future resolving to a stream [`Result`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// A forward-only byte source with suspending reads.
pub trait AsyncSequentialRead: Disposable + Send {
    /// Read up to `buf.len()` bytes. `Ok(0)` for a non-empty `buf` means end
    /// of stream.
    fn read_async<'a>(&'a mut self, buf: &'a mut [u8]) -> BoxFuture<'a, usize>;

    /// Fill `buf` completely, failing with [`StreamError::UnexpectedEof`] if
    /// the stream ends first.
    fn read_exact_async<'a>(&'a mut self, buf: &'a mut [u8]) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let mut filled = 0;
            while filled < buf.len() {
                match self.read_async(&mut buf[filled..]).await? {
                    0 => return Err(StreamError::unexpected_eof((buf.len() - filled) as u64)),
                    n => filled += n,
                }
            }
            Ok(())
        })
    }

    /// Read a single byte, returning `None` at the end of the stream.
    fn read_byte_async(&mut self) -> BoxFuture<'_, Option<u8>> {
        Box::pin(async move {
            let mut byte = [0u8; 1];
            match self.read_async(&mut byte).await? {
                0 => Ok(None),
                _ => Ok(Some(byte[0])),
            }
        })
    }
}

/// A forward-only byte sink with suspending writes.
pub trait AsyncSequentialWrite: Disposable + Send {
    /// Write up to `buf.len()` bytes, returning how many were accepted.
    fn write_async<'a>(&'a mut self, buf: &'a [u8]) -> BoxFuture<'a, usize>;

    /// Push any data held by this stream to its destination.
    fn flush_async(&mut self) -> BoxFuture<'_, ()>;

    /// Write the whole of `buf`.
    fn write_all_async<'a>(&'a mut self, buf: &'a [u8]) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let mut written = 0;
            while written < buf.len() {
                match self.write_async(&buf[written..]).await? {
                    0 => return Err(StreamError::write_zero()),
                    n => written += n,
                }
            }
            Ok(())
        })
    }
}

/// A stream supporting suspending seeks and length queries.
pub trait AsyncRandomAccess: Positioned + Send {
    /// Number of bytes between the start and the end of the stream.
    fn length_async(&mut self) -> BoxFuture<'_, OffsetOf<Self::Position>>;

    /// Move to `position`.
    fn seek_async(&mut self, position: Self::Position) -> BoxFuture<'_, ()>;

    /// Truncate or extend the stream. Unsupported by default.
    fn set_length_async(&mut self, length: OffsetOf<Self::Position>) -> BoxFuture<'_, ()> {
        let _ = length;
        Box::pin(async move {
            self.ensure_open()?;
            Err(StreamError::unsupported("set_length"))
        })
    }

    /// Position just past the last byte.
    fn end_of_stream_async(&mut self) -> BoxFuture<'_, Self::Position> {
        Box::pin(async move {
            let start = self.start_of_stream()?;
            let length = self.length_async().await?;
            advance(start, length, "end_of_stream")
        })
    }
}

/// Suspending, idempotent teardown.
pub trait AsyncDispose: Disposable + Send {
    /// Release the stream, flushing pending data first.
    fn dispose_async(&mut self) -> BoxFuture<'_, ()>;
}

impl<T: AsyncSequentialRead + ?Sized> AsyncSequentialRead for &mut T {
    fn read_async<'a>(&'a mut self, buf: &'a mut [u8]) -> BoxFuture<'a, usize> {
        (**self).read_async(buf)
    }
}

impl<T: AsyncSequentialWrite + ?Sized> AsyncSequentialWrite for &mut T {
    fn write_async<'a>(&'a mut self, buf: &'a [u8]) -> BoxFuture<'a, usize> {
        (**self).write_async(buf)
    }

    fn flush_async(&mut self) -> BoxFuture<'_, ()> {
        (**self).flush_async()
    }
}

impl<T: AsyncRandomAccess + ?Sized> AsyncRandomAccess for &mut T {
    fn length_async(&mut self) -> BoxFuture<'_, OffsetOf<Self::Position>> {
        (**self).length_async()
    }

    fn seek_async(&mut self, position: Self::Position) -> BoxFuture<'_, ()> {
        (**self).seek_async(position)
    }

    fn set_length_async(&mut self, length: OffsetOf<Self::Position>) -> BoxFuture<'_, ()> {
        (**self).set_length_async(length)
    }
}

impl<T: AsyncDispose + ?Sized> AsyncDispose for &mut T {
    fn dispose_async(&mut self) -> BoxFuture<'_, ()> {
        (**self).dispose_async()
    }
}

/// Adapter exposing a Tokio reader or writer as a sequential stream.
///
/// Disposing the adapter only marks it disposed. The wrapped value is
/// released when the adapter is dropped or taken back with
/// [`TokioStream::into_inner`].
#[derive(Debug)]
pub struct TokioStream<T> {
    inner: T,
    state: DisposeState,
}

impl<T> TokioStream<T> {
    /// Wrap a Tokio reader or writer.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            state: DisposeState::Open,
        }
    }

    /// Get a reference to the wrapped value.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Get a mutable reference to the wrapped value.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the adapter and return the wrapped value.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> Disposable for TokioStream<T> {
    fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }

    fn object_name(&self) -> &'static str {
        "TokioStream"
    }
}

impl<T: AsyncRead + Unpin + Send> AsyncSequentialRead for TokioStream<T> {
    fn read_async<'a>(&'a mut self, buf: &'a mut [u8]) -> BoxFuture<'a, usize> {
        Box::pin(async move {
            self.ensure_open()?;
            Ok(self.inner.read(buf).await?)
        })
    }
}

impl<T: AsyncWrite + Unpin + Send> AsyncSequentialWrite for TokioStream<T> {
    fn write_async<'a>(&'a mut self, buf: &'a [u8]) -> BoxFuture<'a, usize> {
        Box::pin(async move {
            self.ensure_open()?;
            Ok(self.inner.write(buf).await?)
        })
    }

    fn flush_async(&mut self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.ensure_open()?;
            Ok(self.inner.flush().await?)
        })
    }
}

impl<T: Send> AsyncDispose for TokioStream<T> {
    fn dispose_async(&mut self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if !self.state.is_disposed() {
                self.state = DisposeState::DisposedAsync;
            }
            Ok(())
        })
    }
}

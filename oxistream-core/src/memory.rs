//! In-memory random-access stream.
//!
//! [`MemoryStream`] is a growable byte buffer with a cursor, generic over the
//! position type. It is the reference provider for the buffered and bit-level
//! layers and records per-call statistics ([`MemoryStats`]) so the number of
//! underlying I/O calls can be observed.
//!
//! Writing past the end zero-fills the gap, like a sparse file.
//!
//! # Example
//!
//! ```
//! use oxistream_core::memory::MemoryStream;
//! use oxistream_core::traits::{Positioned, RandomAccess, SequentialRead, SequentialWrite};
//!
//! let mut stream: MemoryStream<u32> = MemoryStream::new();
//! stream.write_all(b"hello").unwrap();
//! assert_eq!(stream.length().unwrap(), 5);
//!
//! stream.seek(1).unwrap();
//! let mut buf = [0u8; 3];
//! stream.read_exact(&mut buf).unwrap();
//! assert_eq!(&buf, b"ell");
//! assert_eq!(stream.position().unwrap(), 4);
//! ```

use crate::error::{Result, StreamError};
use crate::lifecycle::{DisposeState, Disposable, Dispose};
use crate::position::{OffsetOf, StreamOffset, StreamPosition, advance, distance, offset_from_len};
use crate::traits::{Positioned, RandomAccess, SequentialRead, SequentialWrite};

/// Counters of the calls made against a [`MemoryStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryStats {
    /// Number of `read` calls.
    pub reads: usize,
    /// Number of `write` calls.
    pub writes: usize,
    /// Number of `flush` calls.
    pub flushes: usize,
    /// Number of `seek` calls.
    pub seeks: usize,
    /// Number of `set_length` calls.
    pub set_lengths: usize,
    /// Total bytes returned by `read`.
    pub bytes_read: usize,
    /// Total bytes accepted by `write`.
    pub bytes_written: usize,
}

/// A growable in-memory random-access stream.
#[derive(Debug, Clone)]
pub struct MemoryStream<P: StreamPosition = u64> {
    data: Vec<u8>,
    position: P,
    stats: MemoryStats,
    state: DisposeState,
}

impl<P: StreamPosition> Default for MemoryStream<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: StreamPosition> MemoryStream<P> {
    /// Create an empty stream positioned at the start.
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            position: P::ZERO,
            stats: MemoryStats::default(),
            state: DisposeState::Open,
        }
    }

    /// Create a stream over existing bytes, positioned at the start.
    ///
    /// # Errors
    ///
    /// Fails with [`StreamError::Overflow`] if the length is not representable
    /// by the position type.
    pub fn from_vec(data: Vec<u8>) -> Result<Self> {
        offset_from_len::<OffsetOf<P>>(data.len(), "MemoryStream::from_vec")?;
        Ok(Self {
            data,
            ..Self::new()
        })
    }

    /// Borrow the stream contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Consume the stream and return its contents.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Call statistics recorded so far.
    pub fn stats(&self) -> MemoryStats {
        self.stats
    }

    /// Reset the call statistics.
    pub fn reset_stats(&mut self) {
        self.stats = MemoryStats::default();
    }

    /// Index of the cursor, or `None` when it lies beyond addressable memory.
    fn cursor_index(&self) -> Result<Option<usize>> {
        let offset = distance(self.position, P::ZERO, "MemoryStream position")?;
        let index = offset.saturating_to_usize();
        Ok((index as u128 == offset.to_u128()).then_some(index))
    }
}

impl<P: StreamPosition> Disposable for MemoryStream<P> {
    fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }

    fn object_name(&self) -> &'static str {
        "MemoryStream"
    }
}

impl<P: StreamPosition> Dispose for MemoryStream<P> {
    fn dispose(&mut self) -> Result<()> {
        if !self.state.is_disposed() {
            self.state = DisposeState::Disposed;
        }
        Ok(())
    }
}

impl<P: StreamPosition> SequentialRead for MemoryStream<P> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.ensure_open()?;
        self.stats.reads += 1;

        let Some(start) = self.cursor_index()? else {
            return Ok(0);
        };
        if start >= self.data.len() || buf.is_empty() {
            return Ok(0);
        }

        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        self.position = advance(
            self.position,
            offset_from_len(n, "MemoryStream::read")?,
            "MemoryStream::read",
        )?;
        self.stats.bytes_read += n;
        Ok(n)
    }
}

impl<P: StreamPosition> SequentialWrite for MemoryStream<P> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.ensure_open()?;
        self.stats.writes += 1;
        if buf.is_empty() {
            return Ok(0);
        }

        let end_position = advance(
            self.position,
            offset_from_len(buf.len(), "MemoryStream::write")?,
            "MemoryStream::write",
        )?;
        let start = self
            .cursor_index()?
            .ok_or_else(|| StreamError::overflow("MemoryStream::write"))?;
        let end = start
            .checked_add(buf.len())
            .ok_or_else(|| StreamError::overflow("MemoryStream::write"))?;

        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[start..end].copy_from_slice(buf);
        self.position = end_position;
        self.stats.bytes_written += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.stats.flushes += 1;
        Ok(())
    }
}

impl<P: StreamPosition> Positioned for MemoryStream<P> {
    type Position = P;

    fn position(&self) -> Result<P> {
        self.ensure_open()?;
        Ok(self.position)
    }
}

impl<P: StreamPosition> RandomAccess for MemoryStream<P> {
    fn length(&self) -> Result<OffsetOf<P>> {
        self.ensure_open()?;
        offset_from_len(self.data.len(), "MemoryStream::length")
    }

    fn seek(&mut self, position: P) -> Result<()> {
        self.ensure_open()?;
        self.stats.seeks += 1;
        self.position = position;
        Ok(())
    }

    fn set_length(&mut self, length: OffsetOf<P>) -> Result<()> {
        self.ensure_open()?;
        self.stats.set_lengths += 1;
        let len = length.saturating_to_usize();
        if len as u128 != length.to_u128() {
            return Err(StreamError::overflow("MemoryStream::set_length"));
        }
        self.data.resize(len, 0);
        Ok(())
    }
}

#[cfg(feature = "async-io")]
mod async_impl {
    use super::MemoryStream;
    use crate::async_io::{
        AsyncDispose, AsyncRandomAccess, AsyncSequentialRead, AsyncSequentialWrite, BoxFuture,
    };
    use crate::lifecycle::DisposeState;
    use crate::position::{OffsetOf, StreamPosition};
    use crate::traits::{RandomAccess, SequentialRead, SequentialWrite};

    impl<P: StreamPosition> AsyncSequentialRead for MemoryStream<P> {
        fn read_async<'a>(&'a mut self, buf: &'a mut [u8]) -> BoxFuture<'a, usize> {
            Box::pin(async move { SequentialRead::read(self, buf) })
        }
    }

    impl<P: StreamPosition> AsyncSequentialWrite for MemoryStream<P> {
        fn write_async<'a>(&'a mut self, buf: &'a [u8]) -> BoxFuture<'a, usize> {
            Box::pin(async move { SequentialWrite::write(self, buf) })
        }

        fn flush_async(&mut self) -> BoxFuture<'_, ()> {
            Box::pin(async move { SequentialWrite::flush(self) })
        }
    }

    impl<P: StreamPosition> AsyncRandomAccess for MemoryStream<P> {
        fn length_async(&mut self) -> BoxFuture<'_, OffsetOf<P>> {
            Box::pin(async move { RandomAccess::length(self) })
        }

        fn seek_async(&mut self, position: P) -> BoxFuture<'_, ()> {
            Box::pin(async move { RandomAccess::seek(self, position) })
        }

        fn set_length_async(&mut self, length: OffsetOf<P>) -> BoxFuture<'_, ()> {
            Box::pin(async move { RandomAccess::set_length(self, length) })
        }
    }

    impl<P: StreamPosition> AsyncDispose for MemoryStream<P> {
        fn dispose_async(&mut self) -> BoxFuture<'_, ()> {
            Box::pin(async move {
                if !self.state.is_disposed() {
                    self.state = DisposeState::DisposedAsync;
                }
                Ok(())
            })
        }
    }
}

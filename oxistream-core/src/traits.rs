//! Core stream traits.
//!
//! The stack is built from two capabilities:
//!
//! - **Sequential** streams move forward only: [`SequentialRead`] pulls a block
//!   of bytes, [`SequentialWrite`] pushes one. Both may transfer fewer bytes
//!   than requested.
//! - **Random-access** streams ([`RandomAccess`]) add a generic position,
//!   seeking and a length on top of a sequential stream.
//!
//! Every operation is disposal-guarded: implementations call
//! [`Disposable::ensure_open`] before doing any work.

use crate::error::{Result, StreamError};
use crate::lifecycle::Disposable;
use crate::position::{OffsetOf, StreamOffset, StreamPosition, advance, distance};

/// A forward-only byte source.
pub trait SequentialRead: Disposable {
    /// Read up to `buf.len()` bytes.
    ///
    /// Returns the number of bytes read. `Ok(0)` for a non-empty `buf` means
    /// the end of the stream was reached; it is not an error.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Fill `buf` completely.
    ///
    /// # Errors
    ///
    /// Fails with [`StreamError::UnexpectedEof`] if the stream ends first.
    /// The bytes read before the end are left in `buf`.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read(&mut buf[filled..])? {
                0 => return Err(StreamError::unexpected_eof((buf.len() - filled) as u64)),
                n => filled += n,
            }
        }
        Ok(())
    }

    /// Read a single byte, returning `None` at the end of the stream.
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }
}

/// A forward-only byte sink.
pub trait SequentialWrite: Disposable {
    /// Write up to `buf.len()` bytes, returning how many were accepted.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Push any data held by this stream to its destination.
    fn flush(&mut self) -> Result<()>;

    /// Write the whole of `buf`.
    ///
    /// # Errors
    ///
    /// A write that accepts zero bytes fails with `io::ErrorKind::WriteZero`.
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let mut written = 0;
        while written < buf.len() {
            match self.write(&buf[written..])? {
                0 => return Err(StreamError::write_zero()),
                n => written += n,
            }
        }
        Ok(())
    }
}

/// A stream with a generic position.
///
/// Split out of [`RandomAccess`] because the position is pure bookkeeping and
/// is queried synchronously by both the blocking and the suspending APIs.
pub trait Positioned: Disposable {
    /// The numeric type used for positions.
    type Position: StreamPosition;

    /// Current position.
    fn position(&self) -> Result<Self::Position>;

    /// Position of the first byte. Always the zero position.
    fn start_of_stream(&self) -> Result<Self::Position> {
        self.ensure_open()?;
        Ok(Self::Position::ZERO)
    }
}

/// A stream supporting seeking and a length.
///
/// `start_of_stream() + length() == end_of_stream()` holds at every
/// observable point.
pub trait RandomAccess: Positioned {
    /// Number of bytes between the start and the end of the stream.
    fn length(&self) -> Result<OffsetOf<Self::Position>>;

    /// Move to `position`. Seeking past the end is allowed.
    fn seek(&mut self, position: Self::Position) -> Result<()>;

    /// Truncate or extend the stream.
    ///
    /// # Errors
    ///
    /// The default implementation fails with [`StreamError::Unsupported`].
    fn set_length(&mut self, length: OffsetOf<Self::Position>) -> Result<()> {
        let _ = length;
        self.ensure_open()?;
        Err(StreamError::unsupported("set_length"))
    }

    /// Position just past the last byte.
    fn end_of_stream(&self) -> Result<Self::Position> {
        advance(self.start_of_stream()?, self.length()?, "end_of_stream")
    }

    /// Bytes between the current position and the end, zero when past the end.
    fn remaining(&self) -> Result<OffsetOf<Self::Position>> {
        let consumed = distance(self.position()?, Self::Position::ZERO, "remaining")?;
        Ok(self
            .length()?
            .checked_sub(consumed)
            .unwrap_or(<OffsetOf<Self::Position> as StreamOffset>::ZERO))
    }
}

/// A readable random-access stream.
pub trait RandomAccessRead: RandomAccess + SequentialRead {}

impl<T: RandomAccess + SequentialRead + ?Sized> RandomAccessRead for T {}

/// A writable random-access stream.
pub trait RandomAccessWrite: RandomAccess + SequentialWrite {}

impl<T: RandomAccess + SequentialWrite + ?Sized> RandomAccessWrite for T {}

impl<T: SequentialRead + ?Sized> SequentialRead for &mut T {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }
}

impl<T: SequentialWrite + ?Sized> SequentialWrite for &mut T {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).write(buf)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

impl<T: Positioned + ?Sized> Positioned for &mut T {
    type Position = T::Position;

    fn position(&self) -> Result<Self::Position> {
        (**self).position()
    }
}

impl<T: RandomAccess + ?Sized> RandomAccess for &mut T {
    fn length(&self) -> Result<OffsetOf<Self::Position>> {
        (**self).length()
    }

    fn seek(&mut self, position: Self::Position) -> Result<()> {
        (**self).seek(position)
    }

    fn set_length(&mut self, length: OffsetOf<Self::Position>) -> Result<()> {
        (**self).set_length(length)
    }
}

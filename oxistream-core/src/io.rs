//! Adapter from `std::io` readers and writers to the sequential traits.

use crate::error::Result;
use crate::lifecycle::{DisposeState, Disposable, Dispose};
use crate::traits::{SequentialRead, SequentialWrite};
use std::io::{self, Read, Write};

/// Exposes any [`Read`] or [`Write`] implementation as a sequential stream.
///
/// Reads and writes interrupted by a signal are retried. Disposing an
/// adapter built with [`IoStream::writer`] flushes the writer first.
#[derive(Debug)]
pub struct IoStream<T> {
    inner: T,
    finish: Option<fn(&mut T) -> io::Result<()>>,
    state: DisposeState,
}

impl<T> IoStream<T> {
    /// Wrap a reader.
    pub fn reader(inner: T) -> Self
    where
        T: Read,
    {
        Self {
            inner,
            finish: None,
            state: DisposeState::Open,
        }
    }

    /// Wrap a writer. It is flushed when the adapter is disposed.
    pub fn writer(inner: T) -> Self
    where
        T: Write,
    {
        Self {
            inner,
            finish: Some(<T as Write>::flush),
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

impl<T> Disposable for IoStream<T> {
    fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }

    fn object_name(&self) -> &'static str {
        "IoStream"
    }
}

impl<T: Read> SequentialRead for IoStream<T> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.ensure_open()?;
        loop {
            match self.inner.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl<T: Write> SequentialWrite for IoStream<T> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.ensure_open()?;
        loop {
            match self.inner.write(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.ensure_open()?;
        Ok(self.inner.flush()?)
    }
}

impl<T> Dispose for IoStream<T> {
    fn dispose(&mut self) -> Result<()> {
        if self.state.is_disposed() {
            return Ok(());
        }
        self.state = DisposeState::Disposed;
        match self.finish {
            Some(finish) => Ok(finish(&mut self.inner)?),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_adapter() {
        let mut stream = IoStream::reader(Cursor::new(vec![1u8, 2, 3]));
        let mut buf = [0u8; 2];
        stream.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [1, 2]);
        assert_eq!(stream.read_byte().unwrap(), Some(3));
        assert_eq!(stream.read_byte().unwrap(), None);
    }

    #[test]
    fn test_write_adapter() {
        let mut stream = IoStream::writer(Vec::new());
        stream.write_all(b"abc").unwrap();
        stream.dispose().unwrap();
        stream.dispose().unwrap();
        assert!(stream.write(b"d").unwrap_err().is_disposed());
        assert_eq!(stream.into_inner(), b"abc");
    }

    /// Counts flushes and supports no reads.
    #[derive(Default)]
    struct FlushCounter(usize);

    impl Write for FlushCounter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.0 += 1;
            Ok(())
        }
    }

    #[test]
    fn test_dispose_reader_only() {
        let mut stream = IoStream::reader(&b"xy"[..]);
        assert_eq!(stream.read_byte().unwrap(), Some(b'x'));
        stream.dispose().unwrap();
        assert!(stream.read_byte().unwrap_err().is_disposed());
    }

    #[test]
    fn test_dispose_flushes_writer_once() {
        let mut stream = IoStream::writer(FlushCounter::default());
        stream.dispose().unwrap();
        stream.dispose().unwrap();
        assert_eq!(stream.get_ref().0, 1);
    }
}

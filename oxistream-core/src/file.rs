//! File-backed random-access stream.

use crate::error::{Result, StreamError};
use crate::lifecycle::{DisposeState, Disposable, Dispose};
use crate::position::{OffsetOf, StreamOffset, StreamPosition, advance, distance, offset_from_len};
use crate::traits::{Positioned, RandomAccess, SequentialRead, SequentialWrite};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// A [`File`] exposed as a random-access stream with a generic position type.
///
/// The position is tracked in-process. The length is read from the file
/// metadata on every query, so it reflects writes made through this handle.
#[derive(Debug)]
pub struct FileStream<P: StreamPosition = u64> {
    file: File,
    position: P,
    state: DisposeState,
}

impl<P: StreamPosition> FileStream<P> {
    /// Open an existing file for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file(File::open(path)?)
    }

    /// Create (or truncate) a file for reading and writing.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Self::from_file(file)
    }

    /// Open a file with custom options.
    pub fn open_with(path: impl AsRef<Path>, options: &OpenOptions) -> Result<Self> {
        Self::from_file(options.open(path)?)
    }

    /// Wrap an already opened file, positioned at its start.
    pub fn from_file(mut file: File) -> Result<Self> {
        file.seek(SeekFrom::Start(0))?;
        Ok(Self {
            file,
            position: P::ZERO,
            state: DisposeState::Open,
        })
    }

    /// Get a reference to the underlying file.
    pub fn get_ref(&self) -> &File {
        &self.file
    }

    /// Consume the stream and return the underlying file.
    pub fn into_inner(self) -> File {
        self.file
    }

    fn advance_by(&mut self, count: usize, operation: &str) -> Result<()> {
        self.position = advance(self.position, offset_from_len(count, operation)?, operation)?;
        Ok(())
    }
}

fn to_file_offset<O: StreamOffset>(offset: O, operation: &str) -> Result<u64> {
    u64::try_from(offset.to_u128()).map_err(|_| StreamError::overflow(operation))
}

impl<P: StreamPosition> Disposable for FileStream<P> {
    fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }

    fn object_name(&self) -> &'static str {
        "FileStream"
    }
}

impl<P: StreamPosition> Dispose for FileStream<P> {
    fn dispose(&mut self) -> Result<()> {
        if self.state.is_disposed() {
            return Ok(());
        }
        self.state = DisposeState::Disposed;
        log::debug!("disposing file stream at position {}", self.position);
        Ok(self.file.flush()?)
    }
}

impl<P: StreamPosition> SequentialRead for FileStream<P> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.ensure_open()?;
        let n = self.file.read(buf)?;
        self.advance_by(n, "FileStream::read")?;
        Ok(n)
    }
}

impl<P: StreamPosition> SequentialWrite for FileStream<P> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.ensure_open()?;
        // Reject writes whose end position the position type cannot express.
        advance(
            self.position,
            offset_from_len(buf.len(), "FileStream::write")?,
            "FileStream::write",
        )?;
        let n = self.file.write(buf)?;
        self.advance_by(n, "FileStream::write")?;
        Ok(n)
    }

    fn flush(&mut self) -> Result<()> {
        self.ensure_open()?;
        Ok(self.file.flush()?)
    }
}

impl<P: StreamPosition> Positioned for FileStream<P> {
    type Position = P;

    fn position(&self) -> Result<P> {
        self.ensure_open()?;
        Ok(self.position)
    }
}

impl<P: StreamPosition> RandomAccess for FileStream<P> {
    fn length(&self) -> Result<OffsetOf<P>> {
        self.ensure_open()?;
        let len = self.file.metadata()?.len();
        <OffsetOf<P> as StreamOffset>::from_u128(u128::from(len))
            .ok_or_else(|| StreamError::overflow("FileStream::length"))
    }

    fn seek(&mut self, position: P) -> Result<()> {
        self.ensure_open()?;
        let offset = distance(position, P::ZERO, "FileStream::seek")?;
        self.file
            .seek(SeekFrom::Start(to_file_offset(offset, "FileStream::seek")?))?;
        self.position = position;
        Ok(())
    }

    fn set_length(&mut self, length: OffsetOf<P>) -> Result<()> {
        self.ensure_open()?;
        self.file
            .set_len(to_file_offset(length, "FileStream::set_length")?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("oxistream-file-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_file_roundtrip() {
        let path = temp_path("roundtrip");
        {
            let mut stream: FileStream<u32> = FileStream::create(&path).unwrap();
            stream.write_all(b"0123456789").unwrap();
            assert_eq!(stream.length().unwrap(), 10);
            stream.set_length(4).unwrap();
            assert_eq!(stream.length().unwrap(), 4);
            stream.dispose().unwrap();
            assert!(stream.length().unwrap_err().is_disposed());
        }

        let mut stream: FileStream<u64> = FileStream::open(&path).unwrap();
        stream.seek(1).unwrap();
        let mut buf = [0u8; 3];
        stream.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"123");
        assert_eq!(stream.position().unwrap(), 4);
        assert_eq!(stream.read_byte().unwrap(), None);

        std::fs::remove_file(&path).unwrap();
    }
}

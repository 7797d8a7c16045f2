//! Utility types and functions for the CLI.

use clap::ValueEnum;
use oxistream_bits::{BitOrder, Bits};
use oxistream_core::error::Result;
use oxistream_core::lifecycle::{Disposable, Dispose};
use oxistream_core::position::OffsetOf;
use oxistream_core::traits::{Positioned, RandomAccess, SequentialWrite};
use serde::Serialize;

/// Bit order flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrderArg {
    /// Most significant bit first
    Msb,
    /// Least significant bit first
    Lsb,
}

impl From<OrderArg> for BitOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Msb => BitOrder::MsbFirst,
            OrderArg::Lsb => BitOrder::LsbFirst,
        }
    }
}

/// Padding bit flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FillArg {
    /// Pad with 0 bits
    #[value(name = "0")]
    Zero,
    /// Pad with 1 bits
    #[value(name = "1")]
    One,
}

impl From<FillArg> for bool {
    fn from(arg: FillArg) -> Self {
        arg == FillArg::One
    }
}

/// Counts the write calls that reach the wrapped stream.
#[derive(Debug)]
pub struct CountingStream<S> {
    inner: S,
    writes: usize,
}

impl<S> CountingStream<S> {
    /// Wrap `inner` with a zeroed write counter.
    pub fn new(inner: S) -> Self {
        Self { inner, writes: 0 }
    }

    /// Number of `write` calls forwarded so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl<S: Disposable> Disposable for CountingStream<S> {
    fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    fn object_name(&self) -> &'static str {
        self.inner.object_name()
    }
}

impl<S: Dispose> Dispose for CountingStream<S> {
    fn dispose(&mut self) -> Result<()> {
        self.inner.dispose()
    }
}

impl<S: SequentialWrite> SequentialWrite for CountingStream<S> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.writes += 1;
        self.inner.write(buf)
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }
}

impl<S: Positioned> Positioned for CountingStream<S> {
    type Position = S::Position;

    fn position(&self) -> Result<S::Position> {
        self.inner.position()
    }
}

impl<S: RandomAccess> RandomAccess for CountingStream<S> {
    fn length(&self) -> Result<OffsetOf<S::Position>> {
        self.inner.length()
    }

    fn seek(&mut self, position: S::Position) -> Result<()> {
        self.inner.seek(position)
    }

    fn set_length(&mut self, length: OffsetOf<S::Position>) -> Result<()> {
        self.inner.set_length(length)
    }
}

/// Format bits as digits in groups of eight.
pub fn group_bits(bits: &Bits) -> String {
    let digits = bits.to_string();
    digits
        .as_bytes()
        .chunks(8)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxistream_buffered::BufferedOutput;
    use oxistream_core::memory::MemoryStream;

    #[test]
    fn test_group_bits() {
        let bits: Bits = "1011000011".parse().unwrap();
        assert_eq!(group_bits(&bits), "10110000 11");
        assert_eq!(group_bits(&Bits::new()), "");
    }

    #[test]
    fn test_counting_stream_sees_batched_writes() {
        let counter = CountingStream::new(MemoryStream::<u64>::new());
        let mut out = BufferedOutput::with_capacity(counter, 4).unwrap();
        out.write_all(b"0123456789").unwrap();
        let counter = out.into_inner().unwrap();
        assert_eq!(counter.writes(), 3);
    }

    #[test]
    fn test_flag_conversions() {
        assert_eq!(BitOrder::from(OrderArg::Lsb), BitOrder::LsbFirst);
        assert!(bool::from(FillArg::One));
        assert!(!bool::from(FillArg::Zero));
    }
}

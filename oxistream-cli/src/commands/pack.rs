//! Pack command implementation.

use oxistream_bits::{BitOrder, BitWriter, Bits};
use oxistream_buffered::BufferedOutput;
use oxistream_core::file::FileStream;
use oxistream_core::lifecycle::Dispose;
use oxistream_core::traits::RandomAccess;
use std::path::Path;

pub fn cmd_pack(
    output: &Path,
    digits: &str,
    order: BitOrder,
    fill: bool,
    buffer_size: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let bits: Bits = digits.parse()?;

    let stream: FileStream<u64> = FileStream::create(output)?;
    let out = BufferedOutput::with_capacity(stream, buffer_size)?;
    let mut writer = BitWriter::with_order(out, order).with_fill(fill);
    writer.write_bits(&bits)?;
    writer.flush()?;

    let length = writer.get_ref().length()?;
    writer.dispose()?;

    println!(
        "Packed {} bits into {} bytes ({}, fill {})",
        bits.len(),
        length,
        order,
        fill as u8
    );
    Ok(())
}

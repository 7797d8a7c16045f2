//! Dump command implementation.

use crate::utils::{group_bits, print_json};
use oxistream_bits::{BitOrder, BitReader, Bits};
use oxistream_buffered::BufferedInput;
use oxistream_core::file::FileStream;
use oxistream_core::lifecycle::Dispose;
use oxistream_core::traits::RandomAccess;
use serde::Serialize;
use std::path::Path;

/// JSON serializable bit dump.
#[derive(Debug, Serialize)]
struct DumpJson {
    file: String,
    offset: u64,
    order: String,
    bit_count: usize,
    bits: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<u64>,
}

pub fn cmd_dump(
    file: &Path,
    offset: u64,
    count: Option<usize>,
    order: BitOrder,
    buffer_size: usize,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let stream: FileStream<u64> = FileStream::open(file)?;
    let length = stream.length()?;
    if offset > length {
        return Err(format!("offset {} is beyond the end of the file ({} bytes)", offset, length).into());
    }

    let mut input = BufferedInput::with_capacity(stream, buffer_size)?;
    input.seek(offset)?;
    let mut reader = BitReader::with_order(input, order);

    let bits = match count {
        Some(count) => reader.read_bits_exact(count)?,
        None => {
            let mut bits = Bits::with_capacity(((length - offset) * 8) as usize);
            while let Some(bit) = reader.read_bit()? {
                bits.push(bit);
            }
            bits
        }
    };
    log::debug!("dumped {} bits from {}", bits.len(), file.display());
    reader.dispose()?;

    if json {
        return print_json(&DumpJson {
            file: file.display().to_string(),
            offset,
            order: order.to_string(),
            bit_count: bits.len(),
            value: bits.to_u64(),
            bits: bits.to_string(),
        });
    }

    println!("{}", group_bits(&bits));
    if let Some(value) = bits.to_u64().filter(|_| count.is_some()) {
        println!("= {} ({:#x})", value, value);
    }

    Ok(())
}

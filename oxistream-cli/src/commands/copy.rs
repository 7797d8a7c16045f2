//! Copy command implementation.

use crate::utils::{CountingStream, print_json};
use oxistream_buffered::{BufferedInput, BufferedOutput};
use oxistream_core::file::FileStream;
use oxistream_core::lifecycle::Dispose;
use oxistream_core::traits::{SequentialRead, SequentialWrite};
use serde::Serialize;
use std::path::Path;

/// Size of the chunks moved between the two caches.
const CHUNK_SIZE: usize = 512;

/// JSON serializable copy report.
#[derive(Debug, Serialize)]
struct CopyJson {
    input: String,
    output: String,
    bytes: u64,
    buffer_size: usize,
    underlying_writes: usize,
}

pub fn cmd_copy(
    input: &Path,
    output: &Path,
    buffer_size: usize,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let source: FileStream<u64> = FileStream::open(input)?;
    let mut reader = BufferedInput::with_capacity(source, buffer_size)?;

    let target: FileStream<u64> = FileStream::create(output)?;
    let mut writer = BufferedOutput::with_capacity(CountingStream::new(target), buffer_size)?;

    let mut chunk = [0u8; CHUNK_SIZE];
    let mut bytes = 0u64;
    loop {
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        writer.write_all(&chunk[..n])?;
        bytes += n as u64;
    }
    reader.dispose()?;

    let mut target = writer.into_inner()?;
    let underlying_writes = target.writes();
    target.dispose()?;

    let report = CopyJson {
        input: input.display().to_string(),
        output: output.display().to_string(),
        bytes,
        buffer_size,
        underlying_writes,
    };
    if json {
        return print_json(&report);
    }

    println!(
        "Copied {} bytes from {} to {} in {} writes (buffer {} bytes)",
        report.bytes, report.input, report.output, report.underlying_writes, report.buffer_size
    );
    Ok(())
}

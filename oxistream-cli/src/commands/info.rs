//! Info command implementation.

use crate::utils::print_json;
use oxistream_core::file::FileStream;
use oxistream_core::lifecycle::Dispose;
use oxistream_core::traits::{Positioned, RandomAccess};
use serde::Serialize;
use std::path::Path;

/// JSON serializable stream information.
#[derive(Debug, Serialize)]
struct InfoJson {
    file: String,
    start: u64,
    end: u64,
    length: u64,
}

pub fn cmd_info(file: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut stream: FileStream<u64> = FileStream::open(file)?;
    let info = InfoJson {
        file: file.display().to_string(),
        start: stream.start_of_stream()?,
        end: stream.end_of_stream()?,
        length: stream.length()?,
    };
    stream.dispose()?;

    if json {
        return print_json(&info);
    }

    println!("Stream Information");
    println!("==================");
    println!("File: {}", info.file);
    println!("Start: {}", info.start);
    println!("End: {}", info.end);
    println!("Length: {} bytes ({} bits)", info.length, info.length * 8);

    Ok(())
}

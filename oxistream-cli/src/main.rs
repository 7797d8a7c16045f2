//! OxiStream CLI - bit and byte stream inspection
//!
//! Exercises the buffered and bit-packing layers on real files.

mod commands;
mod utils;

use clap::{Parser, Subcommand};
use commands::{cmd_copy, cmd_dump, cmd_info, cmd_pack};
use oxistream_buffered::DEFAULT_BUFFER_SIZE;
use std::path::PathBuf;
use utils::{FillArg, OrderArg};

#[derive(Parser)]
#[command(name = "oxistream")]
#[command(author, version, about = "Buffered byte and bit stream utility")]
#[command(long_about = "
OxiStream reads and writes files through a buffered random-access layer,
optionally packing or unpacking individual bits.

Examples:
  oxistream info data.bin
  oxistream dump data.bin --offset 16 --count 24
  oxistream dump data.bin --order lsb --json
  oxistream pack out.bin 1011_0000_1
  oxistream pack out.bin 101 --order lsb --fill 1
  oxistream copy data.bin backup.bin --buffer-size 65536
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the bits of a file
    #[command(alias = "d")]
    Dump {
        /// File to read
        file: PathBuf,

        /// Byte offset to start from
        #[arg(short, long, default_value_t = 0)]
        offset: u64,

        /// Number of bits to print (all remaining bits if omitted)
        #[arg(short, long)]
        count: Option<usize>,

        /// Bit order within each byte
        #[arg(long, value_enum, default_value = "msb")]
        order: OrderArg,

        /// Read cache size in bytes
        #[arg(short, long, default_value_t = DEFAULT_BUFFER_SIZE)]
        buffer_size: usize,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Pack a string of 0/1 digits into a file
    #[command(alias = "p")]
    Pack {
        /// Output file (created or truncated)
        output: PathBuf,

        /// Bits to write, e.g. 1011_0000
        bits: String,

        /// Bit order within each byte
        #[arg(long, value_enum, default_value = "msb")]
        order: OrderArg,

        /// Bit used to pad the final byte
        #[arg(long, value_enum, default_value = "0")]
        fill: FillArg,

        /// Write cache size in bytes
        #[arg(short, long, default_value_t = DEFAULT_BUFFER_SIZE)]
        buffer_size: usize,
    },

    /// Copy a file through the buffered streams
    #[command(alias = "cp")]
    Copy {
        /// Source file
        input: PathBuf,

        /// Destination file (created or truncated)
        output: PathBuf,

        /// Cache size in bytes for both sides
        #[arg(short, long, default_value_t = DEFAULT_BUFFER_SIZE)]
        buffer_size: usize,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Show the start, end and length of a file stream
    #[command(alias = "i")]
    Info {
        /// File to inspect
        file: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Dump {
            file,
            offset,
            count,
            order,
            buffer_size,
            json,
        } => cmd_dump(&file, offset, count, order.into(), buffer_size, json),
        Commands::Pack {
            output,
            bits,
            order,
            fill,
            buffer_size,
        } => cmd_pack(&output, &bits, order.into(), fill.into(), buffer_size),
        Commands::Copy {
            input,
            output,
            buffer_size,
            json,
        } => cmd_copy(&input, &output, buffer_size, json),
        Commands::Info { file, json } => cmd_info(&file, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

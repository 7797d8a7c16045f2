//! Integration tests for bit packing over buffered and file-backed streams.

use oxistream_bits::{BitOrder, BitReader, BitWriter, Bits};
use oxistream_buffered::{BufferedInput, BufferedOutput};
use oxistream_core::file::FileStream;
use oxistream_core::lifecycle::Dispose;
use oxistream_core::memory::MemoryStream;
use oxistream_core::traits::{RandomAccess, SequentialRead};

/// Variable-width fields, as a Huffman-style format would write them.
const FIELDS: &[(u64, u8)] = &[
    (0b1, 1),
    (0b10, 2),
    (0x7F, 7),
    (0, 3),
    (0xDEAD_BEEF, 32),
    (0x3, 2),
    (0x1_2345_6789, 37),
    (0, 1),
];

fn total_bits() -> u64 {
    FIELDS.iter().map(|&(_, n)| n as u64).sum()
}

#[test]
fn test_fields_through_buffered_layers() {
    for order in [BitOrder::MsbFirst, BitOrder::LsbFirst] {
        let out = BufferedOutput::with_capacity(MemoryStream::<u32>::new(), 4).unwrap();
        let mut writer = BitWriter::with_order(out, order);
        for &(value, count) in FIELDS {
            writer.write_value(value, count).unwrap();
        }
        assert_eq!(writer.bits_written(), total_bits());

        let buffered = writer.into_inner().unwrap();
        assert_eq!(buffered.length().unwrap() as u64, total_bits().div_ceil(8));
        let bytes = buffered.into_inner().unwrap().into_inner();

        let input = BufferedInput::with_capacity(MemoryStream::<u32>::from_vec(bytes).unwrap(), 4)
            .unwrap();
        let mut reader = BitReader::with_order(input, order);
        for &(value, count) in FIELDS {
            assert_eq!(reader.read_value(count).unwrap(), Some(value), "{}", order);
        }

        // Only padding is left.
        let padding = (8 - total_bits() % 8) % 8;
        assert_eq!(reader.align_to_byte().unwrap() as u64, padding);
        assert_eq!(reader.read_bit().unwrap(), None);
        assert!(reader.is_finished());
    }
}

#[test]
fn test_byte_aligned_bits_match_bytes() {
    let bytes = [0x00u8, 0x01, 0x80, 0xA5, 0xFF];
    let mut reader = BitReader::new(MemoryStream::<u64>::from_vec(bytes.to_vec()).unwrap());
    for &byte in &bytes {
        assert_eq!(reader.read_value(8).unwrap(), Some(byte as u64));
    }

    let mut writer = BitWriter::with_order(MemoryStream::<u64>::new(), BitOrder::LsbFirst);
    for &byte in &bytes {
        let bits: Bits = (0..8).map(|i| (byte >> i) & 1 == 1).collect();
        writer.write_bits(&bits).unwrap();
    }
    assert_eq!(writer.into_inner().unwrap().as_slice(), &bytes);
}

#[test]
fn test_file_roundtrip() {
    let path = std::env::temp_dir().join(format!("oxistream-bits-{}-roundtrip", std::process::id()));
    let pattern: Bits = "1101_0010_0111_1".parse().unwrap();

    {
        let file: FileStream<u64> = FileStream::create(&path).unwrap();
        let mut writer = BitWriter::new(BufferedOutput::new(file));
        for _ in 0..100 {
            writer.write_bits(&pattern).unwrap();
        }
        writer.dispose().unwrap();
    }

    let file: FileStream<u64> = FileStream::open(&path).unwrap();
    assert_eq!(file.length().unwrap(), (13u64 * 100).div_ceil(8));
    let mut reader = BitReader::new(BufferedInput::new(file));
    for _ in 0..100 {
        assert_eq!(reader.read_bits(13).unwrap(), Some(pattern.clone()));
    }
    assert_eq!(reader.read_bits(8).unwrap(), None);
    let mut file = reader.into_inner().into_inner().unwrap();
    assert_eq!(file.read_byte().unwrap(), None);
    file.dispose().unwrap();

    std::fs::remove_file(&path).unwrap();
}

//! Throughput benchmarks for the buffered streams.
//!
//! Compares small sequential reads and writes against a memory stream with
//! and without a cache, across several cache capacities.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxistream_buffered::{BufferedInput, BufferedOutput};
use oxistream_core::memory::MemoryStream;
use oxistream_core::traits::{SequentialRead, SequentialWrite};
use std::hint::black_box;

const DATA_SIZE: usize = 256 * 1024;
const CHUNK: usize = 7;
const CAPACITIES: &[usize] = &[64, 1024, 4096, 65536];

fn random(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut seed: u64 = 0x1234_5678_9ABC_DEF0;
    for _ in 0..size {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        data.push((seed >> 32) as u8);
    }
    data
}

fn bench_writes(c: &mut Criterion) {
    let data = random(DATA_SIZE);
    let mut group = c.benchmark_group("buffered_output");
    group.throughput(Throughput::Bytes(DATA_SIZE as u64));

    group.bench_function("unbuffered", |b| {
        b.iter(|| {
            let mut stream = MemoryStream::<u64>::new();
            for chunk in data.chunks(CHUNK) {
                stream.write_all(black_box(chunk)).unwrap();
            }
            black_box(stream.into_inner())
        })
    });

    for &capacity in CAPACITIES {
        group.bench_with_input(
            BenchmarkId::new("capacity", capacity),
            &capacity,
            |b, &capacity| {
                b.iter(|| {
                    let mut out =
                        BufferedOutput::with_capacity(MemoryStream::<u64>::new(), capacity)
                            .unwrap();
                    for chunk in data.chunks(CHUNK) {
                        out.write_all(black_box(chunk)).unwrap();
                    }
                    black_box(out.into_inner().unwrap())
                })
            },
        );
    }

    group.finish();
}

fn bench_reads(c: &mut Criterion) {
    let data = random(DATA_SIZE);
    let mut group = c.benchmark_group("buffered_input");
    group.throughput(Throughput::Bytes(DATA_SIZE as u64));

    group.bench_function("unbuffered", |b| {
        b.iter(|| {
            let mut stream = MemoryStream::<u64>::from_vec(data.clone()).unwrap();
            let mut chunk = [0u8; CHUNK];
            let mut total = 0;
            while let Ok(n @ 1..) = stream.read(&mut chunk) {
                total += n;
            }
            black_box(total)
        })
    });

    for &capacity in CAPACITIES {
        group.bench_with_input(
            BenchmarkId::new("capacity", capacity),
            &capacity,
            |b, &capacity| {
                b.iter(|| {
                    let stream = MemoryStream::<u64>::from_vec(data.clone()).unwrap();
                    let mut input = BufferedInput::with_capacity(stream, capacity).unwrap();
                    let mut chunk = [0u8; CHUNK];
                    let mut total = 0;
                    while let Ok(n @ 1..) = input.read(&mut chunk) {
                        total += n;
                    }
                    black_box(total)
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_writes, bench_reads);
criterion_main!(benches);

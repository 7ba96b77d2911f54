//! Benchmarks for DEFLATE compression and decompression.

use criterion::{Criterion, criterion_group, criterion_main};
use ruzlib_deflate::{deflate, inflate, zlib_compress, zlib_decompress};
use std::hint::black_box;

fn test_payload(len: usize) -> Vec<u8> {
    let phrase = b"compression benchmarks need text that repeats but not too much. ";
    let mut data = Vec::with_capacity(len);
    let mut state = 0x9E3779B9u32;
    while data.len() < len {
        data.extend_from_slice(phrase);
        state = state.wrapping_mul(747796405).wrapping_add(2891336453);
        data.push((state >> 24) as u8);
    }
    data.truncate(len);
    data
}

fn bench_deflate_levels(c: &mut Criterion) {
    let data = test_payload(256 * 1024);
    let mut group = c.benchmark_group("deflate");
    for level in [1u8, 6, 9] {
        group.bench_function(format!("compress_level_{level}"), |b| {
            b.iter(|| deflate(black_box(&data), level).unwrap());
        });
    }
    group.finish();
}

fn bench_inflate(c: &mut Criterion) {
    let data = test_payload(256 * 1024);
    let compressed = deflate(&data, 6).unwrap();
    c.bench_function("inflate_256k", |b| {
        b.iter(|| inflate(black_box(&compressed)).unwrap());
    });
}

fn bench_zlib_round_trip(c: &mut Criterion) {
    let data = test_payload(64 * 1024);
    c.bench_function("zlib_round_trip_64k", |b| {
        b.iter(|| {
            let compressed = zlib_compress(black_box(&data), 6).unwrap();
            zlib_decompress(&compressed).unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_deflate_levels,
    bench_inflate,
    bench_zlib_round_trip
);
criterion_main!(benches);

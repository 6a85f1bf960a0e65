//! Throughput benchmarks.

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use fastser_bench::encoding::{sample_stream, scan_records};
use fastser_core::{
    BufferedStreamReader, BufferedStreamWriter, Label, MemoryStreamReader, PinnedBufferReader,
    ReaderConfig,
};
use std::hint::black_box;
use std::io::Cursor;

const RECORDS: u32 = 10_000;

fn benchmark_index_scan(c: &mut Criterion) {
    let data = sample_stream(RECORDS).unwrap();
    let mut group = c.benchmark_group("index_scan");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("memory", |b| {
        let mut reader = MemoryStreamReader::new(data.clone());
        b.iter(|| black_box(scan_records(&mut reader).unwrap()))
    });

    for window in [256usize, 4096, 16384] {
        group.bench_function(format!("buffered_{window}"), |b| {
            let mut reader = BufferedStreamReader::with_config(
                Cursor::new(data.clone()),
                ReaderConfig::with_window_size(window),
            )
            .unwrap();
            b.iter(|| black_box(scan_records(&mut reader).unwrap()))
        });
    }

    group.finish();
}

fn benchmark_pinned_chunks(c: &mut Criterion) {
    let data = sample_stream(RECORDS).unwrap();
    let mut group = c.benchmark_group("pinned_chunks");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("get_pointer_1k", |b| {
        let mut reader = PinnedBufferReader::new(Cursor::new(data.clone())).unwrap();
        b.iter(|| {
            reader.goto(Label::ZERO).unwrap();
            let mut remaining = data.len();
            let mut sum = 0u64;
            while remaining > 0 {
                let len = remaining.min(1024);
                let chunk = reader.get_pointer(len).unwrap();
                sum += chunk.iter().map(|&byte| u64::from(byte)).sum::<u64>();
                reader.skip(len).unwrap();
                remaining -= len;
            }
            black_box(sum)
        })
    });

    group.finish();
}

fn benchmark_buffered_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffered_write");
    group.throughput(Throughput::Elements(u64::from(RECORDS)));

    group.bench_function("records_to_vec", |b| {
        let mut sink = Vec::with_capacity(1 << 20);
        b.iter(|| {
            sink.clear();
            let mut writer = BufferedStreamWriter::new(&mut sink).unwrap();
            for id in 0..RECORDS as i32 {
                writer.write_i32(id).unwrap();
                writer.write_i64(i64::from(id)).unwrap();
                writer.write_string(Some("sample-record")).unwrap();
            }
            black_box(writer.length())
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_index_scan,
    benchmark_pinned_chunks,
    benchmark_buffered_write
);
criterion_main!(benches);

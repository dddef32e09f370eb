// benches/store_bench.rs
//! Benchmarks for XML persistence: appends (each a whole-document
//! rewrite) and full-document loads.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use inputlog::event::{button_name, KeyPhase, LogEntry, LogEvent};
use inputlog::store::LogStore;
use tempfile::tempdir;

fn entries(count: usize) -> Vec<LogEntry> {
    (0..count)
        .map(|i| {
            let event = match i % 3 {
                0 => LogEvent::Key {
                    phase: KeyPhase::Typed,
                    key_code: 30,
                    character: 'a',
                },
                1 => LogEvent::MouseMoved {
                    x: i as i32,
                    y: i as i32,
                },
                _ => LogEvent::MouseClicked {
                    x: i as i32,
                    y: i as i32,
                    button: 1,
                    button_name: button_name(1),
                    clicks: 1,
                },
            };
            LogEntry::with_timestamp(None, "entry", event, i as i64 * 10)
        })
        .collect()
}

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_append");
    for size in [10usize, 100] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let dir = tempdir().unwrap();
            let items = entries(size);
            b.iter(|| {
                let mut store = LogStore::create(dir.path().join("bench.xml")).unwrap();
                for entry in &items {
                    store.append(entry).unwrap();
                }
            })
        });
    }
    group.finish();
}

fn bench_load(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bench.xml");
    let mut store = LogStore::create(&path).unwrap();
    for entry in entries(100) {
        store.append(&entry).unwrap();
    }

    c.bench_function("store_load_100", |b| {
        b.iter(|| LogStore::load(black_box(&path)).unwrap())
    });
}

criterion_group!(benches, bench_append, bench_load);
criterion_main!(benches);

// benches/dispatch_bench.rs
//! Benchmarks for the capture hot path: message rendering, entry
//! construction and the queue handoff between hook thread and worker.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use inputlog::capture::{EntryQueue, LoggerKind, DEFAULT_QUEUE_CAPACITY};
use inputlog::event::{button_name, KeyPhase, LogEntry, LogEvent};

fn typed(ch: char) -> LogEvent {
    LogEvent::Key {
        phase: KeyPhase::Typed,
        key_code: 30,
        character: ch,
    }
}

fn clicked() -> LogEvent {
    LogEvent::MouseClicked {
        x: 640,
        y: 480,
        button: 1,
        button_name: button_name(1),
        clicks: 1,
    }
}

fn bench_message_rendering(c: &mut Criterion) {
    let key = typed('a');
    let click = clicked();
    let wheel = LogEvent::MouseWheelMoved {
        x: 640,
        y: 480,
        rotation: -3,
    };

    c.bench_function("render_key_message", |b| {
        b.iter(|| LoggerKind::Key.message_for(black_box(&key)))
    });
    c.bench_function("render_click_message", |b| {
        b.iter(|| LoggerKind::MouseClick.message_for(black_box(&click)))
    });
    c.bench_function("render_wheel_message", |b| {
        b.iter(|| LoggerKind::MouseWheel.message_for(black_box(&wheel)))
    });
}

fn bench_entry_construction(c: &mut Criterion) {
    let event = clicked();
    c.bench_function("build_entry", |b| {
        b.iter(|| {
            let message = LoggerKind::MouseClick.message_for(black_box(&event));
            LogEntry::new(Some(LoggerKind::MouseClick), message, event.clone())
        })
    });
}

fn bench_queue_handoff(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_handoff");
    group.throughput(Throughput::Elements(DEFAULT_QUEUE_CAPACITY as u64));
    group.bench_function("fill_and_drain", |b| {
        let queue = EntryQueue::new(DEFAULT_QUEUE_CAPACITY);
        let entry = LogEntry::with_timestamp(None, "a", typed('a'), 0);
        b.iter(|| {
            for _ in 0..DEFAULT_QUEUE_CAPACITY {
                let _ = queue.push(entry.clone());
            }
            while let Some(popped) = queue.try_pop() {
                black_box(popped);
            }
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_message_rendering,
    bench_entry_construction,
    bench_queue_handoff
);
criterion_main!(benches);

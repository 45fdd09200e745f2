//! Criterion benchmarks for the MediaSync text codec.
//!
//! The relay parses every incoming line on the hot path before fanning it
//! out, so parse latency directly bounds relay throughput.
//!
//! Run with:
//! ```bash
//! cargo bench --package sync-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sync_core::{encode_event, parse_event, EventKind, SyncEvent};

fn bench_parse_valid(c: &mut Criterion) {
    let lines: [&[u8]; 3] = [b"0 0", b"1 97.3", b"2 1234.5678\n"];

    let mut group = c.benchmark_group("parse_valid");
    for line in lines {
        group.bench_with_input(
            std::str::from_utf8(line).unwrap().trim_end().to_string(),
            line,
            |b, line| b.iter(|| parse_event(black_box(line))),
        );
    }
    group.finish();
}

fn bench_parse_invalid(c: &mut Criterion) {
    // Rejection must be cheap too: a misbehaving peer can send garbage at
    // line rate and each bad line is parsed before being dropped.
    let lines: [&[u8]; 3] = [b"", b"5 abc", b"1 97.3 extra"];

    let mut group = c.benchmark_group("parse_invalid");
    for (i, line) in lines.iter().enumerate() {
        group.bench_with_input(format!("case_{i}"), line, |b, line| {
            b.iter(|| parse_event(black_box(line)))
        });
    }
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let event = SyncEvent::new(EventKind::Seek, 42.5);
    c.bench_function("encode_event", |b| {
        b.iter(|| encode_event(black_box(&event)))
    });
}

criterion_group!(benches, bench_parse_valid, bench_parse_invalid, bench_encode);
criterion_main!(benches);

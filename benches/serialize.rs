/// Sink throughput benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use order_stream::{generate, GeneratorConfig, JsonSink, OrderSink, SqliteSink, TextSink};

const ORDERS: i64 = 10_000;

fn batch() -> Vec<order_stream::Order> {
    let config = GeneratorConfig {
        seed: Some(1),
        ..GeneratorConfig::with_orders(ORDERS)
    };
    generate(config).unwrap().batch.into_inner()
}

fn bench_sinks(c: &mut Criterion) {
    let orders = batch();
    let mut group = c.benchmark_group("sink");
    group.throughput(Throughput::Elements(orders.len() as u64));

    group.bench_function("text", |b| {
        b.iter(|| {
            let mut sink = TextSink::new(Vec::with_capacity(orders.len() * 20));
            sink.write(black_box(&orders)).unwrap();
            black_box(sink.into_inner())
        })
    });

    group.bench_function("json", |b| {
        b.iter(|| {
            let mut sink = JsonSink::new(Vec::with_capacity(orders.len() * 60));
            sink.write(black_box(&orders)).unwrap();
            black_box(sink.into_inner())
        })
    });

    group.sample_size(10);
    group.bench_function("sqlite_in_memory", |b| {
        b.iter(|| {
            let mut sink = SqliteSink::open_in_memory("orders").unwrap();
            sink.write(black_box(&orders)).unwrap();
        })
    });

    group.finish();
}

criterion_group!(benches, bench_sinks);
criterion_main!(benches);

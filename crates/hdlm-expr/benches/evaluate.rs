use criterion::{Criterion, black_box, criterion_group, criterion_main};
use hdlm_expr::{Value, evaluate, parse};
use std::collections::BTreeMap;

fn bench_evaluate(c: &mut Criterion) {
    let context = BTreeMap::from([
        ("DEPTH".to_string(), Value::Int(1024)),
        ("WIDTH".to_string(), Value::Int(32)),
        ("SYNC".to_string(), Value::Bool(true)),
    ]);
    let expression = "${SYNC} ? max(log2(DEPTH) + 1, WIDTH // 8) : (1 << 4) - 1";

    c.bench_function("parse", |b| b.iter(|| parse(black_box("max(log2(DEPTH) + 1, WIDTH // 8)"))));
    c.bench_function("evaluate", |b| b.iter(|| evaluate(black_box(expression), &context)));
}

criterion_group!(benches, bench_evaluate);
criterion_main!(benches);

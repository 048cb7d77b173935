use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use sheet_analytics::processing::summarize;
use sheet_analytics::types::{Row, Value};

fn sales_rows(n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| {
            Row::from_pairs([
                ("id", Value::Int64(i as i64)),
                ("region", Value::from(if i % 2 == 0 { "north" } else { "south" })),
                ("amount", Value::Float64((i % 97) as f64 * 1.25)),
                (
                    "qty",
                    if i % 10 == 0 {
                        Value::from("n/a")
                    } else {
                        Value::Int64((i % 13) as i64)
                    },
                ),
                ("flag", Value::Bool(i % 3 == 0)),
            ])
        })
        .collect()
}

fn bench_summarize(c: &mut Criterion) {
    let mut group = c.benchmark_group("summarize");
    for n in [1_000usize, 100_000] {
        let rows = sales_rows(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &rows, |b, rows| {
            b.iter(|| summarize(black_box(rows)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_summarize);
criterion_main!(benches);

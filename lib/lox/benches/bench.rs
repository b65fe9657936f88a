use criterion::{criterion_group, criterion_main, Criterion};
use lox::{Lox, Mode};

pub fn criterion_benchmark(c: &mut Criterion) {
    // Stays below the parser's nesting limit
    let arithmetic = itertools::join((0..200).map(|i| format!("({i} * 2 - {i}) / 3")), " + ");
    c.bench_function("evaluate long arithmetic", |b| {
        b.iter(|| {
            let mut output = Vec::new();
            Lox::new(Mode::Evaluate)
                .run_source(&arithmetic, &mut output, &mut std::io::sink())
                .unwrap();
        })
    });

    let nested = format!("{}\"s\"{}", "(".repeat(200), ")".repeat(200));
    let comparison = format!("!({nested} == {nested}) != (1 <= 2)");
    c.bench_function("parse nested groupings", |b| {
        b.iter(|| {
            let mut output = Vec::new();
            Lox::new(Mode::Parse)
                .run_source(&comparison, &mut output, &mut std::io::sink())
                .unwrap();
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use damage_core::{Deck, Exact, Hand, Weight, expected_damage, expected_damage_exact};

fn expectation_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("expectation");
    for (label, deck, target) in [
        ("standard", Deck::standard(), 4u32),
        ("standard", Deck::standard(), 6u32),
        ("large", Deck::large(), 3u32),
    ] {
        group.bench_function(format!("exact_{label}_{target}"), |b| {
            b.iter(|| {
                expected_damage_exact(
                    black_box(&deck),
                    &Hand::new(),
                    black_box(target),
                    &Exact::one(),
                )
            })
        });
        group.bench_function(format!("f64_{label}_{target}"), |b| {
            b.iter(|| expected_damage::<f64>(black_box(&deck), &Hand::new(), black_box(target), 1.0))
        });
    }
    group.finish();
}

criterion_group!(benches, expectation_bench);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use oikos_genome::{express, founder_genome, point_mutation};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_express(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let genome = founder_genome(&mut rng);

    c.bench_function("express_founder_genome", |b| {
        b.iter(|| express(black_box(&genome)))
    });
}

fn bench_point_mutation(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2);
    let genome = founder_genome(&mut rng);

    c.bench_function("point_mutation", |b| {
        b.iter(|| point_mutation(black_box(&genome), &mut rng))
    });
}

criterion_group!(benches, bench_express, bench_point_mutation);
criterion_main!(benches);

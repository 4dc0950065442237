use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use provider_drift::{ClaimLine, DriftEngine, WeightedDistribution};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SERVICE_CODES: [&str; 12] = [
    "99211", "99212", "99213", "99214", "99215", "99232", "99233", "36415", "80053", "85025",
    "93000", "G0439",
];
const POS: [&str; 2] = ["O", "F"];

/// Synthetic claims: `providers` providers over 2019-2024
fn synthetic_claims(providers: usize, lines_per_period: usize) -> Vec<ClaimLine> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut rows = Vec::with_capacity(providers * lines_per_period * 6);

    for p in 0..providers {
        let npi = format!("{}", 1_000_000_000 + p);
        for year in 2019..=2024 {
            for _ in 0..lines_per_period {
                rows.push(ClaimLine::new(
                    npi.clone(),
                    year,
                    SERVICE_CODES[rng.gen_range(0..SERVICE_CODES.len())],
                    POS[rng.gen_range(0..POS.len())],
                    rng.gen_range(11.0..500.0),
                    rng.gen_range(5.0..400.0),
                ));
            }
        }
    }

    rows
}

/// Single provider drift, the per-request path
fn bench_compute_drift(c: &mut Criterion) {
    let engine = DriftEngine::default();
    let mut group = c.benchmark_group("compute_drift");

    for lines in [10, 100, 1000].iter() {
        let rows = synthetic_claims(1, *lines);
        group.bench_with_input(BenchmarkId::from_parameter(lines), lines, |b, _| {
            b.iter(|| black_box(engine.compute_drift(black_box(&rows), "1000000000")));
        });
    }

    group.finish();
}

/// Whole-dataset scoring
fn bench_compute_all(c: &mut Criterion) {
    let engine = DriftEngine::default();
    let rows = synthetic_claims(500, 20);

    c.bench_function("compute_all_500_providers", |b| {
        b.iter(|| black_box(engine.compute_all(black_box(&rows))));
    });
}

fn bench_entropy(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let codes: Vec<String> = (0..200).map(|i| format!("C{i:04}")).collect();
    let dist = WeightedDistribution::from_pairs(
        codes.iter().map(|code| (code.as_str(), rng.gen_range(1.0..100.0))),
    );

    c.bench_function("entropy_200_categories", |b| {
        b.iter(|| black_box(dist.entropy()));
    });
}

criterion_group!(benches, bench_compute_drift, bench_compute_all, bench_entropy);
criterion_main!(benches);

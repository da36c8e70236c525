//! Benchmarks for the per-frame update and target sampling.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use celestial_hands::interaction::SteeringHand;
use celestial_hands::synthetic::HandPose;
use celestial_hands::{classify, DynamicsConfig, GlyphFieldSampler, Handedness, ParticleField, TargetField};

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    let sampler = GlyphFieldSampler::builtin();

    for count in [1_000usize, 8_000, 32_000] {
        let mut rng = SmallRng::seed_from_u64(1);
        let target = TargetField::new(sampler.sample_with_rng("HELLO", count, 16.0 / 9.0, false, &mut rng));
        let mut field = ParticleField::with_rng(count, DynamicsConfig::default(), &mut rng);

        group.bench_with_input(BenchmarkId::new("idle", count), &count, |b, _| {
            b.iter(|| field.tick(black_box(&target), None))
        });

        let hand = SteeringHand {
            position: Vec3::new(0.5, 0.5, 0.0),
            is_fist: false,
        };
        group.bench_with_input(BenchmarkId::new("steered", count), &count, |b, _| {
            b.iter(|| field.tick(black_box(&target), Some(&hand)))
        });
    }

    group.finish();
}

fn bench_sample(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample");
    group.sample_size(20);
    let sampler = GlyphFieldSampler::builtin();

    for text in ["HI", "HELLO", "I LOVE YOU"] {
        group.bench_with_input(BenchmarkId::new("8000", text), &text, |b, text| {
            let mut rng = SmallRng::seed_from_u64(2);
            b.iter(|| black_box(sampler.sample_with_rng(text, 8000, 16.0 / 9.0, false, &mut rng)))
        });
    }

    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let hand = HandPose::open(3).build(Handedness::Right);
    c.bench_function("classify", |b| b.iter(|| black_box(classify(black_box(&hand)))));
}

criterion_group!(benches, bench_tick, bench_sample, bench_classify);
criterion_main!(benches);

//! Benchmarks for the ADSR envelope generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use ferric_dsp::dsp::envelope::AdsrEnvelope;

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (ramping up)
        let mut env = AdsrEnvelope::adsr(100.0, 100.0, 0.7, 300.0);
        env.trigger(SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = env.next_sample(black_box(SAMPLE_RATE));
                }
                black_box(&buffer);
            })
        });

        // Sustain phase (holding steady)
        let mut env = AdsrEnvelope::adsr(1.0, 1.0, 0.7, 300.0);
        env.trigger(SAMPLE_RATE);
        for _ in 0..200 {
            env.next_sample(SAMPLE_RATE);
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = env.next_sample(black_box(SAMPLE_RATE));
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}

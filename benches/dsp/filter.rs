//! Benchmarks for the state-variable filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use ferric_dsp::dsp::filter::Svf;
use ferric_dsp::dsp::oscillator::Oscillator;

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        let mut source = Oscillator::saw();
        source.set_frequency(110.0);
        let mut input = vec![0.0f32; size];
        source.render(&mut input, SAMPLE_RATE);

        let mut filter = Svf::lowpass(2_500.0);
        filter.set_resonance(0.4);
        let mut buffer = input.clone();

        group.bench_with_input(BenchmarkId::new("lowpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), black_box(SAMPLE_RATE));
            })
        });

        // Cutoff swept every sample, the way a voice drives it.
        group.bench_with_input(BenchmarkId::new("modulated", size), &size, |b, _| {
            b.iter(|| {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    filter.set_cutoff(500.0 + (i as f32 / size as f32) * 4_000.0);
                    *sample = filter.next_sample(black_box(input[i]), SAMPLE_RATE);
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}

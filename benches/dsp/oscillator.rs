//! Benchmarks for oscillator waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use ferric_dsp::dsp::oscillator::{FmPair, Oscillator, Waveform};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, waveform) in [
            ("sine", Waveform::Sine),
            ("saw", Waveform::Saw),
            ("noise", Waveform::Noise),
        ] {
            let mut osc = Oscillator::new(waveform);
            osc.set_frequency(440.0);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    osc.render(black_box(&mut buffer), black_box(SAMPLE_RATE));
                })
            });
        }

        let mut fm = FmPair::new(Waveform::Sine);
        fm.set_frequency(220.0);
        fm.set_ratio(2.0);
        fm.set_depth(1.5);
        group.bench_with_input(BenchmarkId::new("fm_pair", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = fm.next_sample(black_box(SAMPLE_RATE));
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}

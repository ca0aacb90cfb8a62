//! Benchmarks for complete polyphonic engine blocks.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use ferric_dsp::config::EngineConfig;
use ferric_dsp::synth::engine::PolyEngine;

use crate::BLOCK_SIZES;

pub fn bench_poly_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/poly_engine");

    for &size in BLOCK_SIZES {
        let mut engine = PolyEngine::new(EngineConfig::default());
        engine.prepare(48_000.0, size);

        // Saturate the pool so every block renders full polyphony.
        for note in [48u8, 52, 55, 60, 64, 67, 72, 76] {
            engine.note_on(note, 0.9);
        }

        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        group.bench_with_input(BenchmarkId::new("eight_voices", size), &size, |b, _| {
            b.iter(|| {
                engine.render_block(black_box(&mut left), black_box(&mut right));
            })
        });
    }

    group.finish();
}

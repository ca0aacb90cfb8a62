//! Benchmarks for the tape-loop engine.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use ferric_dsp::config::TapeConfig;
use ferric_dsp::tape::TapeLoopEngine;

use crate::BLOCK_SIZES;

pub fn bench_tape_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/tape_loop");

    for &size in BLOCK_SIZES {
        let mut engine = TapeLoopEngine::new(TapeConfig::default());
        engine.prepare(48_000.0, size);
        engine.note_on(57, 1.0);

        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        group.bench_with_input(BenchmarkId::new("record_playback", size), &size, |b, _| {
            b.iter(|| {
                engine.render_block(black_box(&mut left), black_box(&mut right));
            })
        });
    }

    group.finish();
}

use std::f32::consts::TAU;
use std::sync::Arc;

use crate::config::TapeConfig;
use crate::dsp::envelope::AdsrEnvelope;
use crate::dsp::oscillator::Oscillator;
use crate::dsp::saturation::tape_saturate;
use crate::params::TapeParams;
use crate::synth::note_to_freq;
use crate::MAX_BLOCK_SIZE;

/*
Tape-Loop Engine
================

A circular buffer records and plays back at the same time, emulating a
magnetic tape loop with feedback and degradation.

Signal flow, per sample:

  osc pair -> env ---------------------------+--> dry * dry_level --+
      |                                      |                      |
      v                                      |                      v
  write head: buf[w] = buf[w]*feedback       |                    output
              + dry*record_level             |                      ^
                                             |                      |
  read head (wobbled, interpolated) -> tanh saturation              |
              `---------------------------------> loop * loop_level-+

The "recorded" source is an internal detuned oscillator pair gated by an
ADSR and driven through note_on/note_off. Both heads advance one sample
per sample; the wobble LFO only offsets the READ position, so playback
picks up slow pitch variation (wow) while the recording stays put.

The buffer length is fixed when `prepare` runs, from the loop-seconds
parameter and the sample rate. `clear_tape` zeroes content without
resizing; a control-thread clear request lands at the next block start.
*/

/// Detune between the two source oscillators, in cents each way.
const SOURCE_DETUNE_CENTS: f32 = 7.0;
/// Read-position wobble span at full depth, in milliseconds.
const WOBBLE_MAX_MS: f32 = 6.0;

pub struct TapeLoopEngine {
    params: Arc<TapeParams>,
    buffer: Vec<f32>,
    write_head: usize,
    read_head: usize,
    wobble_phase: f32,

    osc_a: Oscillator,
    osc_b: Oscillator,
    source_env: AdsrEnvelope,
    velocity: f32,

    sample_rate: f32,
    max_block_size: usize,
    prepared: bool,
}

impl TapeLoopEngine {
    pub fn new(config: TapeConfig) -> Self {
        Self {
            params: Arc::new(TapeParams::from_config(&config)),
            buffer: Vec::new(),
            write_head: 0,
            read_head: 0,
            wobble_phase: 0.0,

            osc_a: Oscillator::triangle(),
            osc_b: Oscillator::triangle(),
            source_env: AdsrEnvelope::adsr(120.0, 200.0, 0.75, 600.0),
            velocity: 0.0,

            sample_rate: 44_100.0,
            max_block_size: MAX_BLOCK_SIZE,
            prepared: false,
        }
    }

    pub fn params(&self) -> Arc<TapeParams> {
        Arc::clone(&self.params)
    }

    /// Size the loop for the given sample rate and reset all per-sample
    /// state. The loop length is fixed until the next `prepare`.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        self.sample_rate = sample_rate.max(1.0);
        self.max_block_size = max_block_size.clamp(1, MAX_BLOCK_SIZE);

        let len = (self.params.loop_seconds.get() * self.sample_rate)
            .round()
            .max(1.0) as usize;
        if self.buffer.len() == len {
            self.buffer.fill(0.0);
        } else {
            self.buffer = vec![0.0; len];
        }

        self.write_head = 0;
        self.read_head = 0;
        self.wobble_phase = 0.0;
        self.osc_a.reset();
        self.osc_b.reset();
        self.source_env.reset();
        self.velocity = 0.0;
        self.prepared = true;
        log::debug!(
            "tape loop prepared: sample_rate={}, loop_samples={}",
            self.sample_rate,
            len
        );
    }

    /// Pitch the source pair and open its envelope.
    pub fn note_on(&mut self, note: u8, velocity: f32) {
        if !self.prepared {
            return;
        }
        let freq = note_to_freq(note);
        self.osc_a.set_frequency(freq * cents(-SOURCE_DETUNE_CENTS));
        self.osc_b.set_frequency(freq * cents(SOURCE_DETUNE_CENTS));
        self.velocity = velocity.clamp(0.0, 1.0);
        self.source_env.trigger(self.sample_rate);
    }

    pub fn note_off(&mut self) {
        self.source_env.release(self.sample_rate);
    }

    /// Zero the tape content in place. Length and heads are untouched.
    pub fn clear_tape(&mut self) {
        self.buffer.fill(0.0);
    }

    /// Render one block into both channels. Silence before `prepare`.
    pub fn render_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        left.fill(0.0);
        right.fill(0.0);

        let frames = left.len().min(right.len());
        if !self.prepared || frames == 0 || self.buffer.is_empty() {
            return;
        }
        let frames = frames.min(self.max_block_size);

        if self.params.take_clear_request() {
            self.buffer.fill(0.0);
        }

        let snap = self.params.snapshot();
        let sample_rate = self.sample_rate;
        let len = self.buffer.len();
        let depth_samples = snap.wobble_depth * (WOBBLE_MAX_MS / 1000.0) * sample_rate;
        let wobble_increment = snap.wobble_rate_hz / sample_rate;

        for frame in 0..frames {
            let env = self.source_env.next_sample(sample_rate);
            let dry = 0.5
                * (self.osc_a.next_sample(sample_rate) + self.osc_b.next_sample(sample_rate))
                * env
                * self.velocity;

            // Playback first, so the write lands one full loop ahead of
            // the next read of this cell.
            let wobble = (TAU * self.wobble_phase).sin() * depth_samples;
            let raw = read_interpolated(&self.buffer, self.read_head as f32 + wobble);
            let loop_out = tape_saturate(raw, snap.saturation);

            let w = self.write_head;
            self.buffer[w] = self.buffer[w] * snap.feedback + dry * snap.record_level;

            self.write_head = (w + 1) % len;
            self.read_head = (self.read_head + 1) % len;
            self.wobble_phase += wobble_increment;
            self.wobble_phase -= self.wobble_phase.floor();

            let out = (dry * snap.dry_level + loop_out * snap.loop_level) * snap.master_level;
            left[frame] = out;
            right[frame] = out;
        }
    }

    pub fn is_source_active(&self) -> bool {
        self.source_env.is_active()
    }

    pub fn loop_samples(&self) -> usize {
        self.buffer.len()
    }
}

#[inline]
fn cents(cents: f32) -> f32 {
    2.0_f32.powf(cents / 1200.0)
}

/// Linear-interpolated read at a fractional position, with wraparound in
/// both directions (the wobble can push the position negative).
#[inline]
fn read_interpolated(buffer: &[f32], position: f32) -> f32 {
    let len = buffer.len() as f32;
    let position = position.rem_euclid(len);
    let i0 = (position as usize).min(buffer.len() - 1);
    let i1 = if i0 + 1 == buffer.len() { 0 } else { i0 + 1 };
    let frac = position - i0 as f32;
    buffer[i0] + (buffer[i1] - buffer[i0]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with(loop_seconds: f32) -> TapeLoopEngine {
        let config = TapeConfig {
            loop_seconds,
            ..TapeConfig::default()
        };
        let mut e = TapeLoopEngine::new(config);
        e.prepare(44_100.0, 512);
        e
    }

    fn render_once(e: &mut TapeLoopEngine) -> Vec<f32> {
        let mut left = vec![0.0; 512];
        let mut right = vec![0.0; 512];
        e.render_block(&mut left, &mut right);
        left
    }

    #[test]
    fn loop_length_fixed_at_prepare() {
        let e = engine_with(0.5);
        assert_eq!(e.loop_samples(), 22_050);
    }

    #[test]
    fn clear_keeps_length() {
        let mut e = engine_with(0.5);
        e.note_on(57, 1.0);
        for _ in 0..20 {
            render_once(&mut e);
        }
        e.clear_tape();
        assert_eq!(e.loop_samples(), 22_050);
    }

    #[test]
    fn source_note_sounds_dry() {
        let mut e = engine_with(1.0);
        e.note_on(57, 1.0);
        let out = render_once(&mut e);
        let peak = out.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        assert!(peak > 0.01, "dry source should be audible, peak was {peak}");
    }

    #[test]
    fn recorded_note_plays_back_from_loop() {
        let mut e = engine_with(0.25);
        // Record roughly one loop's worth of source.
        e.note_on(57, 1.0);
        for _ in 0..22 {
            render_once(&mut e);
        }
        e.note_off();
        // Let the release finish, then listen to the loop only.
        for _ in 0..80 {
            render_once(&mut e);
        }
        e.params().dry_level.set(0.0);
        assert!(!e.is_source_active());

        let out = render_once(&mut e);
        let peak = out.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        assert!(peak > 1e-4, "loop playback should be audible, peak was {peak}");
    }

    #[test]
    fn render_before_prepare_is_silence() {
        let mut e = TapeLoopEngine::new(TapeConfig::default());
        let mut left = vec![0.5; 64];
        let mut right = vec![0.5; 64];
        e.render_block(&mut left, &mut right);
        assert!(left.iter().all(|&s| s == 0.0));
    }
}

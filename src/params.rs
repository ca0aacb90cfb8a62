//! One-writer/one-reader parameter cells shared between a control surface
//! and the render path.
//!
//! Each parameter is a range-bounded float stored as the bit pattern of an
//! `f32` in an `AtomicU32`. The control thread writes with `set` (which
//! clamps), the render path reads a whole-parameter-set snapshot once per
//! block. A single atomic word cannot tear, and Relaxed ordering is enough
//! for values where stale-by-one-block is acceptable. Nothing here locks.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::config::{EngineConfig, TapeConfig};
use crate::dsp::oscillator::Waveform;

/// A named, range-bounded, atomically shared float value.
pub struct Param {
    bits: AtomicU32,
    min: f32,
    max: f32,
}

impl Param {
    pub fn new(value: f32, min: f32, max: f32) -> Self {
        Self {
            bits: AtomicU32::new(value.clamp(min, max).to_bits()),
            min,
            max,
        }
    }

    /// Store a new value. Out-of-range input clamps silently; the render
    /// path never sees an invalid value and never has to reject one.
    pub fn set(&self, value: f32) {
        let clamped = if value.is_finite() {
            value.clamp(self.min, self.max)
        } else {
            self.min
        };
        self.bits.store(clamped.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }
}

/// Waveform selector stored as its stable index.
pub struct WaveformCell {
    index: AtomicU32,
}

impl WaveformCell {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            index: AtomicU32::new(waveform.index()),
        }
    }

    pub fn set(&self, waveform: Waveform) {
        self.index.store(waveform.index(), Ordering::Relaxed);
    }

    pub fn get(&self) -> Waveform {
        Waveform::from_index(self.index.load(Ordering::Relaxed))
    }
}

/// Parameters of the polyphonic engine. Owned behind an `Arc`: the engine
/// keeps one handle for per-block snapshots, the control thread the other.
pub struct SynthParams {
    pub waveform: WaveformCell,
    pub attack_ms: Param,
    pub decay_ms: Param,
    pub sustain_level: Param,
    pub release_ms: Param,
    pub cutoff_hz: Param,
    pub resonance: Param,
    pub filter_env_amount: Param,
    pub fm_ratio: Param,
    pub fm_depth: Param,
    pub master_gain: Param,
}

impl SynthParams {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            waveform: WaveformCell::new(config.waveform),
            attack_ms: Param::new(config.attack_ms, 0.1, 10_000.0),
            decay_ms: Param::new(config.decay_ms, 0.1, 10_000.0),
            sustain_level: Param::new(config.sustain_level, 0.0, 1.0),
            release_ms: Param::new(config.release_ms, 0.1, 10_000.0),
            cutoff_hz: Param::new(config.cutoff_hz, 20.0, 18_000.0),
            resonance: Param::new(config.resonance, 0.0, 0.95),
            filter_env_amount: Param::new(config.filter_env_amount, 0.0, 10_000.0),
            fm_ratio: Param::new(config.fm_ratio, 0.0, 16.0),
            fm_depth: Param::new(config.fm_depth, 0.0, 8.0),
            master_gain: Param::new(config.master_gain, 0.0, 1.5),
        }
    }

    /// One coherent read of every parameter, taken at block start.
    pub fn snapshot(&self) -> SynthSnapshot {
        SynthSnapshot {
            waveform: self.waveform.get(),
            attack_ms: self.attack_ms.get(),
            decay_ms: self.decay_ms.get(),
            sustain_level: self.sustain_level.get(),
            release_ms: self.release_ms.get(),
            cutoff_hz: self.cutoff_hz.get(),
            resonance: self.resonance.get(),
            filter_env_amount: self.filter_env_amount.get(),
            fm_ratio: self.fm_ratio.get(),
            fm_depth: self.fm_depth.get(),
            master_gain: self.master_gain.get(),
        }
    }
}

/// Plain-value copy of `SynthParams`, valid for one block.
#[derive(Debug, Clone, Copy)]
pub struct SynthSnapshot {
    pub waveform: Waveform,
    pub attack_ms: f32,
    pub decay_ms: f32,
    pub sustain_level: f32,
    pub release_ms: f32,
    pub cutoff_hz: f32,
    pub resonance: f32,
    pub filter_env_amount: f32,
    pub fm_ratio: f32,
    pub fm_depth: f32,
    pub master_gain: f32,
}

/// Drum engine parameters: a master gain plus one gain per channel, in
/// channel order (kick, snare, hat, perc).
pub struct DrumParams {
    pub master_gain: Param,
    pub channel_gains: [Param; 4],
}

impl DrumParams {
    pub fn new() -> Self {
        Self {
            master_gain: Param::new(0.9, 0.0, 1.5),
            channel_gains: [
                Param::new(1.0, 0.0, 1.5),
                Param::new(1.0, 0.0, 1.5),
                Param::new(1.0, 0.0, 1.5),
                Param::new(1.0, 0.0, 1.5),
            ],
        }
    }

    pub fn snapshot(&self) -> DrumSnapshot {
        DrumSnapshot {
            master_gain: self.master_gain.get(),
            channel_gains: [
                self.channel_gains[0].get(),
                self.channel_gains[1].get(),
                self.channel_gains[2].get(),
                self.channel_gains[3].get(),
            ],
        }
    }
}

impl Default for DrumParams {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DrumSnapshot {
    pub master_gain: f32,
    pub channel_gains: [f32; 4],
}

/// Tape-loop engine parameters. `loop_seconds` is read once at `prepare`;
/// everything else is snapshotted per block.
pub struct TapeParams {
    pub loop_seconds: Param,
    pub feedback: Param,
    pub record_level: Param,
    pub saturation: Param,
    pub wobble_rate_hz: Param,
    pub wobble_depth: Param,
    pub dry_level: Param,
    pub loop_level: Param,
    pub master_level: Param,
    clear_requested: AtomicBool,
}

impl TapeParams {
    pub fn from_config(config: &TapeConfig) -> Self {
        Self {
            loop_seconds: Param::new(config.loop_seconds, 0.25, 30.0),
            feedback: Param::new(config.feedback, 0.0, 1.0),
            record_level: Param::new(config.record_level, 0.0, 1.0),
            saturation: Param::new(config.saturation, 0.0, 1.0),
            wobble_rate_hz: Param::new(config.wobble_rate_hz, 0.0, 10.0),
            wobble_depth: Param::new(config.wobble_depth, 0.0, 1.0),
            dry_level: Param::new(config.dry_level, 0.0, 1.0),
            loop_level: Param::new(config.loop_level, 0.0, 1.0),
            master_level: Param::new(config.master_level, 0.0, 1.5),
            clear_requested: AtomicBool::new(false),
        }
    }

    /// Ask the render path to zero the tape at the start of its next block.
    pub fn request_clear(&self) {
        self.clear_requested.store(true, Ordering::Relaxed);
    }

    pub(crate) fn take_clear_request(&self) -> bool {
        self.clear_requested.swap(false, Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> TapeSnapshot {
        TapeSnapshot {
            feedback: self.feedback.get(),
            record_level: self.record_level.get(),
            saturation: self.saturation.get(),
            wobble_rate_hz: self.wobble_rate_hz.get(),
            wobble_depth: self.wobble_depth.get(),
            dry_level: self.dry_level.get(),
            loop_level: self.loop_level.get(),
            master_level: self.master_level.get(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TapeSnapshot {
    pub feedback: f32,
    pub record_level: f32,
    pub saturation: f32,
    pub wobble_rate_hz: f32,
    pub wobble_depth: f32,
    pub dry_level: f32,
    pub loop_level: f32,
    pub master_level: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_clamps_to_range() {
        let p = Param::new(0.5, 0.0, 1.0);
        p.set(2.0);
        assert!((p.get() - 1.0).abs() < f32::EPSILON);
        p.set(-3.0);
        assert!((p.get() - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn non_finite_input_falls_to_range_floor() {
        let p = Param::new(0.5, 0.0, 1.0);
        p.set(f32::NAN);
        assert!((p.get() - 0.0).abs() < f32::EPSILON);
        p.set(f32::INFINITY);
        assert!((p.get() - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn waveform_round_trips_through_cell() {
        let cell = WaveformCell::new(Waveform::Sine);
        cell.set(Waveform::Pulse);
        assert_eq!(cell.get(), Waveform::Pulse);
    }

    #[test]
    fn clear_request_is_consumed_once() {
        let params = TapeParams::from_config(&crate::config::TapeConfig::default());
        assert!(!params.take_clear_request());
        params.request_clear();
        assert!(params.take_clear_request());
        assert!(!params.take_clear_request());
    }
}

//! Construction-time configuration for the engines.
//!
//! These are plain-data structs: they seed the runtime parameter sets and
//! fix pool sizes and drum recipes at `prepare` time. With the `serde`
//! feature they can be stored alongside a session.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::filter::FilterMode;
use crate::dsp::oscillator::Waveform;

/// Polyphonic engine defaults.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fixed voice-pool size. Never changes after `prepare`.
    pub polyphony: usize,
    pub waveform: Waveform,
    pub attack_ms: f32,
    pub decay_ms: f32,
    pub sustain_level: f32,
    pub release_ms: f32,
    pub cutoff_hz: f32,
    pub resonance: f32,
    /// Filter envelope contribution to cutoff, in Hz at full level.
    pub filter_env_amount: f32,
    pub fm_ratio: f32,
    pub fm_depth: f32,
    pub master_gain: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            polyphony: 8,
            waveform: Waveform::Saw,
            attack_ms: 10.0,
            decay_ms: 120.0,
            sustain_level: 0.7,
            release_ms: 250.0,
            cutoff_hz: 2_200.0,
            resonance: 0.2,
            filter_env_amount: 2_800.0,
            fm_ratio: 2.0,
            fm_depth: 0.0,
            master_gain: 0.8,
        }
    }
}

/// Recipe for one drum channel.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct DrumConfig {
    pub carrier_waveform: Waveform,
    /// Frequency the pitch sweep settles on.
    pub base_freq: f32,
    pub fm_ratio: f32,
    pub fm_depth: f32,
    /// Sweep start offset: the hit begins at base_freq * (1 + pitch_amount).
    pub pitch_amount: f32,
    pub pitch_decay_ms: f32,
    pub amp_attack_ms: f32,
    pub amp_decay_ms: f32,
    /// Noise blended in before the filter, 0 (none) to 1 (noise only).
    pub noise_mix: f32,
    pub filter_mode: FilterMode,
    pub cutoff_hz: f32,
}

/// The four fixed drum channels.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct DrumKitConfig {
    pub kick: DrumConfig,
    pub snare: DrumConfig,
    pub hat: DrumConfig,
    pub perc: DrumConfig,
}

impl Default for DrumKitConfig {
    fn default() -> Self {
        Self {
            // Sine body with a fast sweep from ~4.5x down to the fundamental.
            kick: DrumConfig {
                carrier_waveform: Waveform::Sine,
                base_freq: 48.0,
                fm_ratio: 1.0,
                fm_depth: 0.0,
                pitch_amount: 3.5,
                pitch_decay_ms: 55.0,
                amp_attack_ms: 0.5,
                amp_decay_ms: 300.0,
                noise_mix: 0.05,
                filter_mode: FilterMode::LowPass,
                cutoff_hz: 220.0,
            },
            // Tonal body plus wire rattle from band-passed noise.
            snare: DrumConfig {
                carrier_waveform: Waveform::Triangle,
                base_freq: 185.0,
                fm_ratio: 1.7,
                fm_depth: 0.6,
                pitch_amount: 1.2,
                pitch_decay_ms: 45.0,
                amp_attack_ms: 0.5,
                amp_decay_ms: 180.0,
                noise_mix: 0.65,
                filter_mode: FilterMode::BandPass,
                cutoff_hz: 2_800.0,
            },
            // Mostly noise, inharmonic FM for the metallic edge.
            hat: DrumConfig {
                carrier_waveform: Waveform::Square,
                base_freq: 5_200.0,
                fm_ratio: 1.47,
                fm_depth: 1.8,
                pitch_amount: 0.0,
                pitch_decay_ms: 20.0,
                amp_attack_ms: 0.5,
                amp_decay_ms: 70.0,
                noise_mix: 0.8,
                filter_mode: FilterMode::HighPass,
                cutoff_hz: 6_800.0,
            },
            perc: DrumConfig {
                carrier_waveform: Waveform::Sine,
                base_freq: 320.0,
                fm_ratio: 2.0,
                fm_depth: 0.9,
                pitch_amount: 0.8,
                pitch_decay_ms: 35.0,
                amp_attack_ms: 0.5,
                amp_decay_ms: 140.0,
                noise_mix: 0.2,
                filter_mode: FilterMode::BandPass,
                cutoff_hz: 1_200.0,
            },
        }
    }
}

/// Tape-loop engine defaults.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct TapeConfig {
    /// Loop length in seconds. Read once, at `prepare`.
    pub loop_seconds: f32,
    pub feedback: f32,
    pub record_level: f32,
    pub saturation: f32,
    pub wobble_rate_hz: f32,
    pub wobble_depth: f32,
    pub dry_level: f32,
    pub loop_level: f32,
    pub master_level: f32,
}

impl Default for TapeConfig {
    fn default() -> Self {
        Self {
            loop_seconds: 4.0,
            feedback: 0.45,
            record_level: 0.8,
            saturation: 0.3,
            wobble_rate_hz: 0.6,
            wobble_depth: 0.25,
            dry_level: 0.7,
            loop_level: 0.8,
            master_level: 0.9,
        }
    }
}

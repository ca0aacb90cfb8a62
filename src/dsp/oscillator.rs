use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Saw,
    Square,
    Pulse,
    Triangle,
    Noise,
}

impl Waveform {
    /// Stable index used when a waveform travels through an atomic parameter.
    pub fn index(self) -> u32 {
        match self {
            Waveform::Sine => 0,
            Waveform::Saw => 1,
            Waveform::Square => 2,
            Waveform::Pulse => 3,
            Waveform::Triangle => 4,
            Waveform::Noise => 5,
        }
    }

    pub fn from_index(index: u32) -> Self {
        match index {
            1 => Waveform::Saw,
            2 => Waveform::Square,
            3 => Waveform::Pulse,
            4 => Waveform::Triangle,
            5 => Waveform::Noise,
            _ => Waveform::Sine,
        }
    }
}

const MAX_FREQUENCY_HZ: f32 = 20_000.0;
const NOISE_SEED: u32 = 0x9E37_79B9;

/// Single oscillator with a phase accumulator in [0, 1).
///
/// `next_sample` advances the phase by `frequency / sample_rate` and wraps.
/// The noise waveform is a seeded xorshift generator so a `reset` always
/// reproduces the same sequence.
pub struct Oscillator {
    waveform: Waveform,
    frequency: f32,
    phase: f32,
    pulse_width: f32,
    noise_state: u32,
}

impl Oscillator {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            frequency: 440.0,
            phase: 0.0,
            pulse_width: 0.5,
            noise_state: NOISE_SEED,
        }
    }

    pub fn sine() -> Self {
        Self::new(Waveform::Sine)
    }

    pub fn saw() -> Self {
        Self::new(Waveform::Saw)
    }

    pub fn square() -> Self {
        Self::new(Waveform::Square)
    }

    pub fn pulse(width: f32) -> Self {
        let mut osc = Self::new(Waveform::Pulse);
        osc.set_pulse_width(width);
        osc
    }

    pub fn triangle() -> Self {
        Self::new(Waveform::Triangle)
    }

    pub fn noise() -> Self {
        Self::new(Waveform::Noise)
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency.clamp(0.0, MAX_FREQUENCY_HZ);
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn set_pulse_width(&mut self, width: f32) {
        self.pulse_width = width.clamp(0.05, 0.95);
    }

    /// Rewind phase and reseed noise. Identical output after every reset.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.noise_state = NOISE_SEED;
    }

    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        let value = match self.waveform {
            Waveform::Sine => (TAU * self.phase).sin(),
            Waveform::Saw => 2.0 * self.phase - 1.0,
            Waveform::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Pulse => {
                if self.phase < self.pulse_width {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => 4.0 * (self.phase - 0.5).abs() - 1.0,
            Waveform::Noise => self.next_noise(),
        };

        self.phase += self.frequency / sample_rate.max(1.0);
        self.phase -= self.phase.floor();

        value
    }

    pub fn render(&mut self, out: &mut [f32], sample_rate: f32) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(sample_rate);
        }
    }

    fn next_noise(&mut self) -> f32 {
        // xorshift32
        let mut x = self.noise_state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.noise_state = x;
        (x as f32 / u32::MAX as f32) * 2.0 - 1.0
    }
}

/// Two-operator FM: a modulator oscillator scales the carrier's
/// instantaneous frequency before the carrier is evaluated.
///
///   carrier_freq = base * (1 + depth * modulator_output)
///
/// With `depth` at zero this degenerates to a plain oscillator, which is how
/// pitched voices run when FM is switched off.
pub struct FmPair {
    carrier: Oscillator,
    modulator: Oscillator,
    base_frequency: f32,
    ratio: f32,
    depth: f32,
}

impl FmPair {
    pub fn new(carrier_waveform: Waveform) -> Self {
        Self {
            carrier: Oscillator::new(carrier_waveform),
            modulator: Oscillator::sine(),
            base_frequency: 440.0,
            ratio: 2.0,
            depth: 0.0,
        }
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.base_frequency = frequency.clamp(0.0, MAX_FREQUENCY_HZ);
        self.modulator
            .set_frequency(self.base_frequency * self.ratio);
    }

    pub fn frequency(&self) -> f32 {
        self.base_frequency
    }

    /// Modulator/carrier frequency ratio. Integer ratios give harmonic
    /// sidebands, odd ratios like 1.47 give the clangorous tones drums want.
    pub fn set_ratio(&mut self, ratio: f32) {
        self.ratio = ratio.clamp(0.0, 16.0);
        self.modulator
            .set_frequency(self.base_frequency * self.ratio);
    }

    pub fn set_depth(&mut self, depth: f32) {
        self.depth = depth.clamp(0.0, 8.0);
    }

    pub fn set_carrier_waveform(&mut self, waveform: Waveform) {
        self.carrier.set_waveform(waveform);
    }

    pub fn reset(&mut self) {
        self.carrier.reset();
        self.modulator.reset();
    }

    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        // The modulator always advances so enabling depth mid-note is phase
        // continuous.
        let modulation = self.modulator.next_sample(sample_rate);
        let swept = self.base_frequency * (1.0 + self.depth * modulation);
        self.carrier.set_frequency(swept.max(0.0));
        self.carrier.next_sample(sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    #[test]
    fn valid_sine() {
        let mut osc = Oscillator::sine();
        osc.set_frequency(440.0);

        let mut buffer = vec![0.0f32; 128];
        osc.render(&mut buffer, SAMPLE_RATE);

        // sample n should be sin(2pi f n / sr)
        let sample_index = 12;
        let expected = (TAU * 440.0 * sample_index as f32 / SAMPLE_RATE).sin();
        let actual = buffer[sample_index];
        assert!(
            (actual - expected).abs() < 1e-5,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn phase_stays_wrapped() {
        let mut osc = Oscillator::saw();
        osc.set_frequency(12_345.0);
        for _ in 0..10_000 {
            let s = osc.next_sample(SAMPLE_RATE);
            assert!((-1.0..=1.0).contains(&s));
        }
        assert!((0.0..1.0).contains(&osc.phase));
    }

    #[test]
    fn pulse_width_changes_duty_cycle() {
        let mut narrow = Oscillator::pulse(0.1);
        let mut wide = Oscillator::pulse(0.9);
        narrow.set_frequency(100.0);
        wide.set_frequency(100.0);

        let count_high = |osc: &mut Oscillator| {
            (0..480).filter(|_| osc.next_sample(SAMPLE_RATE) > 0.0).count()
        };

        let narrow_high = count_high(&mut narrow);
        let wide_high = count_high(&mut wide);
        assert!(
            wide_high > narrow_high * 3,
            "wide pulse should stay high longer: {narrow_high} vs {wide_high}"
        );
    }

    #[test]
    fn noise_is_deterministic_after_reset() {
        let mut osc = Oscillator::noise();
        let first: Vec<f32> = (0..64).map(|_| osc.next_sample(SAMPLE_RATE)).collect();
        osc.reset();
        let second: Vec<f32> = (0..64).map(|_| osc.next_sample(SAMPLE_RATE)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn fm_depth_changes_output() {
        let mut plain = FmPair::new(Waveform::Sine);
        plain.set_frequency(220.0);

        let mut modulated = FmPair::new(Waveform::Sine);
        modulated.set_frequency(220.0);
        modulated.set_ratio(2.0);
        modulated.set_depth(1.5);

        let a: Vec<f32> = (0..256).map(|_| plain.next_sample(SAMPLE_RATE)).collect();
        let b: Vec<f32> = (0..256).map(|_| modulated.next_sample(SAMPLE_RATE)).collect();

        assert!(a.iter().zip(&b).any(|(x, y)| (x - y).abs() > 0.01));
        assert!(b.iter().all(|s| s.is_finite() && s.abs() <= 1.0));
    }
}

use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
| response  | passes          | rejects      |
| --------- | --------------- | ------------ |
| low-pass  | below cutoff    | above cutoff |
| high-pass | above cutoff    | below cutoff |
| band-pass | around cutoff   | outside      |
| notch     | outside         | around cutoff|

Topology-preserving state-variable filter. All four responses fall out of
the same two integrator states, so the mode is just an output selector.

Cutoff and resonance are clamped into coefficient ranges that keep the
filter numerically stable: cutoff never crosses 0.45 * sample_rate, and
resonance stays below the self-oscillation threshold (the damping factor
k = 2 - 2*resonance is kept strictly positive).
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    LowPass,
    HighPass,
    BandPass,
    Notch,
}

pub const MIN_CUTOFF_HZ: f32 = 20.0;
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;
/// Resonance ceiling. Keeps k = 2 - 2*r at or above 0.1, below the point
/// where the loop gain reaches unity.
pub const MAX_RESONANCE: f32 = 0.95;

pub struct Svf {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    cutoff_hz: f32,
    resonance: f32,
    mode: FilterMode,
}

impl Svf {
    pub fn new(mode: FilterMode) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz: 1000.0,
            resonance: 0.0,
            mode,
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        let mut f = Self::new(FilterMode::LowPass);
        f.set_cutoff(cutoff_hz);
        f
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        let mut f = Self::new(FilterMode::HighPass);
        f.set_cutoff(cutoff_hz);
        f
    }

    pub fn bandpass(cutoff_hz: f32) -> Self {
        let mut f = Self::new(FilterMode::BandPass);
        f.set_cutoff(cutoff_hz);
        f
    }

    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.cutoff_hz = cutoff_hz.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ);
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance = resonance.clamp(0.0, MAX_RESONANCE);
    }

    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    /// Process one sample. Coefficients are derived from the current cutoff
    /// every call, so per-sample cutoff modulation is supported.
    pub fn next_sample(&mut self, input: f32, sample_rate: f32) -> f32 {
        let sample_rate = sample_rate.max(1.0);
        let cutoff = self.cutoff_hz.min(sample_rate * 0.45);
        let g = (PI * cutoff / sample_rate).tan();
        let k = 2.0 - 2.0 * self.resonance;

        let a1 = 1.0 / (1.0 + g * (g + k));
        let v3 = input - self.ic2eq;
        let v1 = a1 * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        match self.mode {
            FilterMode::LowPass => v2,
            FilterMode::BandPass => v1,
            FilterMode::HighPass => input - k * v1 - v2,
            FilterMode::Notch => input - k * v1,
        }
    }

    pub fn render(&mut self, buffer: &mut [f32], sample_rate: f32) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, sample_rate);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::Oscillator;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn peak_after_transient(buffer: &[f32]) -> f32 {
        let skip = buffer.len().min(32);
        buffer
            .get(skip..)
            .unwrap_or(buffer)
            .iter()
            .fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    fn rendered_sine(freq: f32, len: usize) -> Vec<f32> {
        let mut osc = Oscillator::sine();
        osc.set_frequency(freq);
        let mut buffer = vec![0.0f32; len];
        osc.render(&mut buffer, SAMPLE_RATE);
        buffer
    }

    #[test]
    fn lowpass_passes_dc() {
        let mut filter = Svf::lowpass(500.0);
        let mut buffer = vec![1.0; 256];
        filter.render(&mut buffer, SAMPLE_RATE);
        assert!(buffer[255] > 0.99);
    }

    #[test]
    fn highpass_rejects_dc() {
        let mut filter = Svf::highpass(500.0);
        let mut buffer = vec![1.0; 256];
        filter.render(&mut buffer, SAMPLE_RATE);
        assert!(buffer[255].abs() < 0.001);
    }

    #[test]
    fn lowpass_attenuates_high_freq() {
        let mut filter = Svf::lowpass(500.0);
        let mut buffer = rendered_sine(5_000.0, 256);
        filter.render(&mut buffer, SAMPLE_RATE);

        let peak = peak_after_transient(&buffer);
        assert!(peak < 0.3, "expected attenuation 10x above cutoff, got {peak}");
    }

    #[test]
    fn bandpass_emphasizes_cutoff_frequency() {
        let mut filter = Svf::bandpass(1_000.0);
        filter.set_resonance(0.5);

        let mut pass = rendered_sine(1_000.0, 512);
        filter.render(&mut pass, SAMPLE_RATE);
        let pass_peak = peak_after_transient(&pass);

        filter.reset();
        let mut off = rendered_sine(200.0, 512);
        filter.render(&mut off, SAMPLE_RATE);
        let off_peak = peak_after_transient(&off);

        assert!(
            pass_peak > off_peak * 2.0,
            "bandpass should emphasize cutoff: pass={pass_peak}, off={off_peak}"
        );
    }

    #[test]
    fn resonance_is_clamped_below_instability() {
        let mut filter = Svf::lowpass(1_000.0);
        filter.set_resonance(4.0);
        assert!(filter.resonance() <= MAX_RESONANCE);

        // Hammer it with a loud input at the cutoff; output must stay finite
        // and bounded without blowing up.
        let mut buffer = rendered_sine(1_000.0, 4_096);
        for s in buffer.iter_mut() {
            *s *= 2.0;
        }
        filter.render(&mut buffer, SAMPLE_RATE);
        assert!(buffer.iter().all(|s| s.is_finite()));
        assert!(peak_after_transient(&buffer) < 50.0);
    }

    #[test]
    fn cutoff_is_clamped_to_valid_range() {
        let mut filter = Svf::lowpass(1_000.0);
        filter.set_cutoff(-100.0);
        assert!((filter.cutoff() - MIN_CUTOFF_HZ).abs() < f32::EPSILON);
        filter.set_cutoff(1.0e9);
        assert!((filter.cutoff() - MAX_CUTOFF_HZ).abs() < f32::EPSILON);
    }

    #[test]
    fn per_sample_cutoff_modulation_stays_finite() {
        let mut filter = Svf::lowpass(400.0);
        let input = rendered_sine(440.0, 2_048);
        for (i, &x) in input.iter().enumerate() {
            // Sweep the cutoff over the whole range while processing.
            filter.set_cutoff(20.0 + (i as f32 / 2_048.0) * 19_000.0);
            let y = filter.next_sample(x, SAMPLE_RATE);
            assert!(y.is_finite());
        }
    }
}

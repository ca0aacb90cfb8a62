use crate::config::DrumConfig;
use crate::dsp::envelope::DecayEnvelope;
use crate::dsp::filter::Svf;
use crate::dsp::oscillator::{FmPair, Oscillator};

/// One-shot percussive voice: two-operator FM with a pitch sweep, an
/// attack/decay amplitude envelope and optional noise mixed in before the
/// filter.
///
/// A hit is started with `trigger`, not note-on/off; there is no release
/// stage, the voice rings down to silence on its own. The pitch envelope
/// sweeps the carrier from `base_freq * (1 + pitch_amount)` back down to
/// `base_freq` over the configured decay.
pub struct DrumVoice {
    fm: FmPair,
    noise: Oscillator,
    filter: Svf,
    amp_env: DecayEnvelope,
    pitch_env: DecayEnvelope,

    base_freq: f32,
    pitch_amount: f32,
    noise_mix: f32,
    velocity: f32,
}

impl DrumVoice {
    pub fn new(config: &DrumConfig) -> Self {
        let mut fm = FmPair::new(config.carrier_waveform);
        fm.set_frequency(config.base_freq);
        fm.set_ratio(config.fm_ratio);
        fm.set_depth(config.fm_depth);

        let mut filter = Svf::new(config.filter_mode);
        filter.set_cutoff(config.cutoff_hz);

        Self {
            fm,
            noise: Oscillator::noise(),
            filter,
            amp_env: DecayEnvelope::new(config.amp_attack_ms, config.amp_decay_ms),
            pitch_env: DecayEnvelope::new(0.1, config.pitch_decay_ms),
            base_freq: config.base_freq,
            pitch_amount: config.pitch_amount.max(0.0),
            noise_mix: config.noise_mix.clamp(0.0, 1.0),
            velocity: 0.0,
        }
    }

    /// Fire the hit. Retriggering restarts the sweep and envelopes in
    /// place; phases and the noise seed rewind so every hit is identical
    /// for identical input.
    pub fn trigger(&mut self, velocity: f32, sample_rate: f32) {
        self.velocity = velocity.clamp(0.0, 1.0);
        self.fm.reset();
        self.noise.reset();
        self.filter.reset();
        // Full rewind, unlike the gated ADSR: repeated hits must be
        // sample-identical, and the sub-millisecond attack leaves no
        // level to resume from anyway.
        self.amp_env.reset();
        self.pitch_env.reset();
        self.amp_env.trigger(sample_rate);
        self.pitch_env.trigger(sample_rate);
    }

    /// Cut the hit short, returning to silence immediately.
    pub fn kill(&mut self) {
        self.velocity = 0.0;
        self.amp_env.reset();
        self.pitch_env.reset();
        self.fm.reset();
        self.noise.reset();
        self.filter.reset();
    }

    /// Accumulate into pre-zeroed stereo buffers, scaled by `gain`.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32], gain: f32, sample_rate: f32) {
        if !self.is_active() {
            return;
        }
        debug_assert_eq!(left.len(), right.len());

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let sweep = 1.0 + self.pitch_amount * self.pitch_env.next_sample(sample_rate);
            self.fm.set_frequency(self.base_freq * sweep);

            let tone = self.fm.next_sample(sample_rate);
            let hiss = self.noise.next_sample(sample_rate);
            let mixed = tone * (1.0 - self.noise_mix) + hiss * self.noise_mix;
            let shaped = self.filter.next_sample(mixed, sample_rate);

            let sample = shaped * self.amp_env.next_sample(sample_rate) * self.velocity * gain;
            *l += sample;
            *r += sample;
        }
    }

    /// True while the amplitude envelope is still ringing down.
    pub fn is_active(&self) -> bool {
        !self.amp_env.is_idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DrumKitConfig;

    const SAMPLE_RATE: f32 = 44_100.0;

    fn render_once(voice: &mut DrumVoice, frames: usize) -> Vec<f32> {
        let mut left = vec![0.0; frames];
        let mut right = vec![0.0; frames];
        voice.render(&mut left, &mut right, 1.0, SAMPLE_RATE);
        left
    }

    #[test]
    fn kick_sounds_and_rings_down() {
        let kit = DrumKitConfig::default();
        let mut kick = DrumVoice::new(&kit.kick);
        kick.trigger(1.0, SAMPLE_RATE);

        let first = render_once(&mut kick, 512);
        let peak = first.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        assert!(peak > 0.01, "kick should sound, peak was {peak}");

        // 300ms decay: well under 100 blocks of 512 at 44.1k.
        let mut blocks = 0;
        while kick.is_active() && blocks < 100 {
            render_once(&mut kick, 512);
            blocks += 1;
        }
        assert!(!kick.is_active(), "one-shot must reach silence by itself");
    }

    #[test]
    fn retrigger_is_deterministic() {
        let kit = DrumKitConfig::default();
        let mut snare = DrumVoice::new(&kit.snare);

        snare.trigger(0.8, SAMPLE_RATE);
        let first = render_once(&mut snare, 256);
        snare.trigger(0.8, SAMPLE_RATE);
        let second = render_once(&mut snare, 256);

        assert_eq!(first, second, "identical hits must produce identical samples");
    }

    #[test]
    fn untriggered_voice_is_inactive_and_silent() {
        let kit = DrumKitConfig::default();
        let mut hat = DrumVoice::new(&kit.hat);
        assert!(!hat.is_active());
        let out = render_once(&mut hat, 64);
        assert!(out.iter().all(|&s| s == 0.0));
    }
}
